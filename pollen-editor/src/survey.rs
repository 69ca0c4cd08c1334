//! Survey model edited by the view-models.
//!
//! Field names follow the survey JSON document (camelCase) so a survey
//! loaded from the API round-trips unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::i18n::I18nString;

// ============================================================================
// ENUMS
// ============================================================================

/// Distribution channel of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyType {
    #[default]
    Link,
    App,
    Website,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    OpenText,
    MultipleChoiceSingle,
    MultipleChoiceMulti,
    Nps,
    Rating,
    Cta,
    Consent,
    Date,
}

impl QuestionType {
    /// Whether the question carries a list of choices.
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoiceSingle | QuestionType::MultipleChoiceMulti
        )
    }
}

// ============================================================================
// QUESTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: I18nString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub headline: I18nString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheader: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_label: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_button_label: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_label: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_label: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Question {
    /// A required question with only a headline set.
    pub fn new(id: impl Into<String>, question_type: QuestionType, headline: I18nString) -> Self {
        Self {
            id: id.into(),
            question_type,
            headline,
            subheader: None,
            placeholder: None,
            button_label: None,
            back_button_label: None,
            lower_label: None,
            upper_label: None,
            choices: Vec::new(),
            image_url: None,
            video_url: None,
            required: true,
        }
    }

    /// Localized text field by its form input id.
    pub fn text_field(&self, id: &str) -> Option<&I18nString> {
        match id {
            "headline" => Some(&self.headline),
            "subheader" => self.subheader.as_ref(),
            "placeholder" => self.placeholder.as_ref(),
            "buttonLabel" => self.button_label.as_ref(),
            "backButtonLabel" => self.back_button_label.as_ref(),
            "lowerLabel" => self.lower_label.as_ref(),
            "upperLabel" => self.upper_label.as_ref(),
            _ => None,
        }
    }

    pub fn has_media(&self) -> bool {
        has_value(&self.image_url) || has_value(&self.video_url)
    }
}

/// Partial update of a question. `None` leaves a field untouched; for
/// optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    pub id: Option<String>,
    pub headline: Option<I18nString>,
    pub subheader: Option<Option<I18nString>>,
    pub placeholder: Option<Option<I18nString>>,
    pub button_label: Option<Option<I18nString>>,
    pub choices: Option<Vec<Choice>>,
    pub image_url: Option<Option<String>>,
    pub video_url: Option<Option<String>>,
    pub required: Option<bool>,
}

impl QuestionPatch {
    pub fn apply_to(self, question: &mut Question) {
        if let Some(id) = self.id {
            question.id = id;
        }
        if let Some(headline) = self.headline {
            question.headline = headline;
        }
        if let Some(subheader) = self.subheader {
            question.subheader = subheader;
        }
        if let Some(placeholder) = self.placeholder {
            question.placeholder = placeholder;
        }
        if let Some(button_label) = self.button_label {
            question.button_label = button_label;
        }
        if let Some(choices) = self.choices {
            question.choices = choices;
        }
        if let Some(image_url) = self.image_url {
            question.image_url = image_url;
        }
        if let Some(video_url) = self.video_url {
            question.video_url = video_url;
        }
        if let Some(required) = self.required {
            question.required = required;
        }
    }
}

// ============================================================================
// WELCOME AND ENDING CARDS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeCard {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_label: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl WelcomeCard {
    pub fn text_field(&self, id: &str) -> Option<&I18nString> {
        match id {
            "headline" => self.headline.as_ref(),
            "html" => self.html.as_ref(),
            "buttonLabel" => self.button_label.as_ref(),
            _ => None,
        }
    }

    pub fn has_media(&self) -> bool {
        has_value(&self.file_url) || has_value(&self.video_url)
    }
}

/// Ending card that shows a closing message and an optional call-to-action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndScreenCard {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheader: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_label: Option<I18nString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl EndScreenCard {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn text_field(&self, id: &str) -> Option<&I18nString> {
        match id {
            "headline" => self.headline.as_ref(),
            "subheader" => self.subheader.as_ref(),
            "buttonLabel" => self.button_label.as_ref(),
            _ => None,
        }
    }

    /// Apply a patch sent by the ending card form.
    pub fn apply(&mut self, patch: EndScreenPatch) {
        if let Some(headline) = patch.headline {
            self.headline = headline;
        }
        if let Some(subheader) = patch.subheader {
            self.subheader = subheader;
        }
        if let Some(button_label) = patch.button_label {
            self.button_label = button_label;
        }
        if let Some(button_link) = patch.button_link {
            self.button_link = button_link;
        }
    }

    pub fn has_media(&self) -> bool {
        has_value(&self.image_url) || has_value(&self.video_url)
    }
}

/// Ending card that sends the respondent to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectCard {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EndingCard {
    EndScreen(EndScreenCard),
    RedirectToUrl(RedirectCard),
}

impl EndingCard {
    pub fn id(&self) -> &str {
        match self {
            EndingCard::EndScreen(card) => &card.id,
            EndingCard::RedirectToUrl(card) => &card.id,
        }
    }

    pub fn as_end_screen(&self) -> Option<&EndScreenCard> {
        match self {
            EndingCard::EndScreen(card) => Some(card),
            EndingCard::RedirectToUrl(_) => None,
        }
    }

    pub fn as_end_screen_mut(&mut self) -> Option<&mut EndScreenCard> {
        match self {
            EndingCard::EndScreen(card) => Some(card),
            EndingCard::RedirectToUrl(_) => None,
        }
    }

    pub fn has_media(&self) -> bool {
        self.as_end_screen().is_some_and(EndScreenCard::has_media)
    }
}

/// Partial update of an end screen card. `None` leaves a field untouched and
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndScreenPatch {
    pub headline: Option<Option<I18nString>>,
    pub subheader: Option<Option<I18nString>>,
    pub button_label: Option<Option<I18nString>>,
    pub button_link: Option<Option<String>>,
}

// ============================================================================
// SURVEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub survey_type: SurveyType,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub welcome_card: WelcomeCard,
    #[serde(default)]
    pub endings: Vec<EndingCard>,
    /// Language codes the survey is translated into, besides `"default"`.
    #[serde(default)]
    pub language_codes: Vec<String>,
}

impl Survey {
    pub fn new(id: impl Into<String>, name: impl Into<String>, survey_type: SurveyType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            survey_type,
            questions: Vec::new(),
            welcome_card: WelcomeCard::default(),
            endings: Vec::new(),
            language_codes: Vec::new(),
        }
    }

    pub fn question(&self, index: usize) -> EditorResult<&Question> {
        let len = self.questions.len();
        self.questions
            .get(index)
            .ok_or(EditorError::QuestionIndexOutOfRange { index, len })
    }

    pub fn question_mut(&mut self, index: usize) -> EditorResult<&mut Question> {
        let len = self.questions.len();
        self.questions
            .get_mut(index)
            .ok_or(EditorError::QuestionIndexOutOfRange { index, len })
    }

    pub fn end_screen_mut(&mut self, index: usize) -> EditorResult<&mut EndScreenCard> {
        let len = self.endings.len();
        self.endings
            .get_mut(index)
            .ok_or(EditorError::EndingIndexOutOfRange { index, len })?
            .as_end_screen_mut()
            .ok_or(EditorError::NotAnEndScreen { index })
    }

    pub fn has_question_id(&self, id: &str) -> bool {
        self.questions.iter().any(|q| q.id == id)
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ending_card_tagged_by_type() -> Result<(), serde_json::Error> {
        let raw = r#"[
            {"type":"endScreen","id":"end1","headline":{"default":"Thanks!"},"buttonLink":"https://x.io"},
            {"type":"redirectToUrl","id":"end2","url":"https://y.io"}
        ]"#;
        let endings: Vec<EndingCard> = serde_json::from_str(raw)?;
        let end_screen = endings[0].as_end_screen().unwrap();
        assert_eq!(end_screen.button_link.as_deref(), Some("https://x.io"));
        assert!(endings[1].as_end_screen().is_none());
        assert_eq!(endings[1].id(), "end2");
        Ok(())
    }

    #[test]
    fn test_end_screen_patch_distinguishes_clear_from_untouched() {
        let mut card = EndScreenCard {
            headline: Some(I18nString::default_only("Thanks")),
            button_link: Some("https://x.io".to_string()),
            ..EndScreenCard::new("end1")
        };
        card.apply(EndScreenPatch {
            button_link: Some(None),
            ..Default::default()
        });
        assert_eq!(card.button_link, None);
        assert_eq!(card.headline, Some(I18nString::default_only("Thanks")));
    }

    #[test]
    fn test_question_patch_applies_selected_fields() {
        let mut question = Question::new("q1", QuestionType::OpenText, I18nString::default_only("A"));
        QuestionPatch {
            headline: Some(I18nString::default_only("B")),
            required: Some(false),
            ..Default::default()
        }
        .apply_to(&mut question);
        assert_eq!(question.headline.localized("default"), "B");
        assert!(!question.required);
        assert_eq!(question.id, "q1");
    }

    #[test]
    fn test_end_screen_mut_rejects_redirect() {
        let mut survey = Survey::new("s1", "Survey", SurveyType::Link);
        survey.endings.push(EndingCard::RedirectToUrl(RedirectCard {
            id: "r".to_string(),
            url: None,
            label: None,
        }));
        assert_eq!(
            survey.end_screen_mut(0).unwrap_err(),
            EditorError::NotAnEndScreen { index: 0 }
        );
        assert_eq!(
            survey.end_screen_mut(3).unwrap_err(),
            EditorError::EndingIndexOutOfRange { index: 3, len: 1 }
        );
    }

    #[test]
    fn test_media_ignores_empty_urls() {
        let mut question = Question::new("q1", QuestionType::Cta, I18nString::default());
        question.image_url = Some(String::new());
        assert!(!question.has_media());
        question.video_url = Some("https://video".to_string());
        assert!(question.has_media());
    }
}
