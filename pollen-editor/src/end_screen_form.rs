//! Form state for an end screen ending card.
//!
//! The form never touches the survey itself. Every edit becomes an
//! [`EndScreenPatch`] handed to an [`EndingCardUpdater`]; the only state kept
//! here is whether the call-to-action section is shown.

use tracing::debug;

use crate::error::EditorResult;
use crate::i18n::{localized_value, I18nString};
use crate::question_form_input::get_placeholder_by_id;
use crate::survey::{EndScreenCard, EndScreenPatch, EndingCard, Survey};
use crate::traits::EndingCardUpdater;

/// Button label set when the call-to-action is switched on.
pub const DEFAULT_CTA_LABEL: &str = "Create your own Survey";

/// Button link set when the call-to-action is switched on.
pub const DEFAULT_CTA_LINK: &str = "https://formbricks.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Localized text edited per language.
    Localized,
    /// Plain URL input.
    Url,
}

/// One input rendered by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    /// Current value in the selected language.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndScreenForm {
    ending_card_index: usize,
    selected_language_code: String,
    show_cta: bool,
}

impl EndScreenForm {
    /// The call-to-action starts shown when the card is an end screen that
    /// already has a button label (in the selected language) or a link.
    pub fn new(
        card: &EndingCard,
        ending_card_index: usize,
        selected_language_code: impl Into<String>,
    ) -> Self {
        let selected_language_code = selected_language_code.into();
        let show_cta = card.as_end_screen().is_some_and(|card| {
            !localized_value(card.button_label.as_ref(), &selected_language_code).is_empty()
                || card.button_link.as_deref().is_some_and(|link| !link.is_empty())
        });
        Self {
            ending_card_index,
            selected_language_code,
            show_cta,
        }
    }

    pub fn show_cta(&self) -> bool {
        self.show_cta
    }

    pub fn ending_card_index(&self) -> usize {
        self.ending_card_index
    }

    pub fn selected_language_code(&self) -> &str {
        &self.selected_language_code
    }

    /// Position of the card in the editor's combined question/ending order.
    pub fn question_idx(&self, survey: &Survey) -> usize {
        survey.questions.len() + self.ending_card_index
    }

    pub fn fields(&self, card: &EndScreenCard) -> Vec<FormField> {
        let lang = self.selected_language_code.as_str();
        let mut fields = vec![
            FormField {
                id: "headline",
                label: "Note*",
                placeholder: get_placeholder_by_id("headline"),
                kind: FieldKind::Localized,
                value: localized_value(card.headline.as_ref(), lang).to_string(),
            },
            FormField {
                id: "subheader",
                label: "Description",
                placeholder: get_placeholder_by_id("subheader"),
                kind: FieldKind::Localized,
                value: localized_value(card.subheader.as_ref(), lang).to_string(),
            },
        ];
        if self.show_cta {
            fields.push(FormField {
                id: "buttonLabel",
                label: "Button Label",
                placeholder: DEFAULT_CTA_LABEL,
                kind: FieldKind::Localized,
                value: localized_value(card.button_label.as_ref(), lang).to_string(),
            });
            fields.push(FormField {
                id: "buttonLink",
                label: "Button Link",
                placeholder: DEFAULT_CTA_LINK,
                kind: FieldKind::Url,
                value: card.button_link.clone().unwrap_or_default(),
            });
        }
        fields
    }

    /// Switch the call-to-action section. Turning it off clears the button
    /// label and link; turning it on fills in the defaults. The switch only
    /// flips once the updater accepted the patch.
    pub fn toggle_cta<U>(&mut self, updater: &mut U) -> EditorResult<bool>
    where
        U: EndingCardUpdater + ?Sized,
    {
        let patch = if self.show_cta {
            EndScreenPatch {
                button_label: Some(None),
                button_link: Some(None),
                ..Default::default()
            }
        } else {
            EndScreenPatch {
                button_label: Some(Some(I18nString::default_only(DEFAULT_CTA_LABEL))),
                button_link: Some(Some(DEFAULT_CTA_LINK.to_string())),
                ..Default::default()
            }
        };
        updater.update_survey(patch)?;
        self.show_cta = !self.show_cta;
        debug!(
            ending_card_index = self.ending_card_index,
            show_cta = self.show_cta,
            "Toggled ending card CTA"
        );
        Ok(self.show_cta)
    }

    pub fn set_headline<U>(&self, card: &EndScreenCard, text: &str, updater: &mut U) -> EditorResult<()>
    where
        U: EndingCardUpdater + ?Sized,
    {
        let headline = self.with_text(card.headline.as_ref(), text);
        updater.update_survey(EndScreenPatch {
            headline: Some(Some(headline)),
            ..Default::default()
        })
    }

    pub fn set_subheader<U>(&self, card: &EndScreenCard, text: &str, updater: &mut U) -> EditorResult<()>
    where
        U: EndingCardUpdater + ?Sized,
    {
        let subheader = self.with_text(card.subheader.as_ref(), text);
        updater.update_survey(EndScreenPatch {
            subheader: Some(Some(subheader)),
            ..Default::default()
        })
    }

    pub fn set_button_label<U>(
        &self,
        card: &EndScreenCard,
        text: &str,
        updater: &mut U,
    ) -> EditorResult<()>
    where
        U: EndingCardUpdater + ?Sized,
    {
        let button_label = self.with_text(card.button_label.as_ref(), text);
        updater.update_survey(EndScreenPatch {
            button_label: Some(Some(button_label)),
            ..Default::default()
        })
    }

    pub fn set_button_link<U>(&self, link: &str, updater: &mut U) -> EditorResult<()>
    where
        U: EndingCardUpdater + ?Sized,
    {
        updater.update_survey(EndScreenPatch {
            button_link: Some(Some(link.to_string())),
            ..Default::default()
        })
    }

    // Other languages keep their text; only the selected one is replaced.
    fn with_text(&self, current: Option<&I18nString>, text: &str) -> I18nString {
        let mut value = current.cloned().unwrap_or_default();
        value.set(&self.selected_language_code, text);
        value
    }
}
