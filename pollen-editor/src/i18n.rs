//! Localized survey text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language key every localized string carries.
pub const DEFAULT_LANGUAGE: &str = "default";

/// Text keyed by language code, with `"default"` as the fallback entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct I18nString(BTreeMap<String, String>);

impl I18nString {
    /// Same text under `"default"` and every given language code.
    pub fn new(text: &str, language_codes: &[String]) -> Self {
        let mut values = BTreeMap::new();
        values.insert(DEFAULT_LANGUAGE.to_string(), text.to_string());
        for code in language_codes {
            values.insert(code.clone(), text.to_string());
        }
        Self(values)
    }

    /// Text under `"default"` only.
    pub fn default_only(text: &str) -> Self {
        Self::new(text, &[])
    }

    /// Text for `language_code`, or the empty string when it has no entry.
    pub fn localized(&self, language_code: &str) -> &str {
        self.0.get(language_code).map(String::as_str).unwrap_or("")
    }

    /// Set the text for one language.
    pub fn set(&mut self, language_code: &str, text: &str) {
        self.0.insert(language_code.to_string(), text.to_string());
    }

    /// True when no language has non-empty text.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Localized text of an optional field, empty when the field is unset.
pub fn localized_value<'a>(value: Option<&'a I18nString>, language_code: &str) -> &'a str {
    value.map(|v| v.localized(language_code)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_every_language() {
        let text = I18nString::new("", &["de".to_string(), "fr".to_string()]);
        let languages: Vec<_> = text.languages().collect();
        assert_eq!(languages, vec!["de", "default", "fr"]);
        assert!(text.is_blank());
    }

    #[test]
    fn test_localized_missing_language_is_empty() {
        let text = I18nString::default_only("Create your own Survey");
        assert_eq!(text.localized("default"), "Create your own Survey");
        assert_eq!(text.localized("de"), "");
        assert_eq!(localized_value(None, "default"), "");
    }

    #[test]
    fn test_serializes_as_plain_map() -> Result<(), serde_json::Error> {
        let text = I18nString::default_only("Hi");
        assert_eq!(serde_json::to_string(&text)?, r#"{"default":"Hi"}"#);
        let back: I18nString = serde_json::from_str(r#"{"default":"Hi","de":"Hallo"}"#)?;
        assert_eq!(back.localized("de"), "Hallo");
        Ok(())
    }
}
