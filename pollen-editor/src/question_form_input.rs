//! Lookup helpers shared by the question form inputs.

use crate::i18n::I18nString;
use crate::survey::{EndingCard, Question, Survey};

/// Choice position encoded in a form input id such as `"choice-2"`.
///
/// Only the leading digits after the first `-` count, so `"choice-3x"` is 3.
/// Returns `None` for non-choice inputs or ids without a number.
pub fn get_choice_index(id: &str, is_choice: bool) -> Option<usize> {
    if !is_choice {
        return None;
    }
    let part = id.split('-').nth(1)?;
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Label of the choice at `choice_idx`, or a blank string in every language.
pub fn get_choice_label(
    question: &Question,
    choice_idx: usize,
    survey_language_codes: &[String],
) -> I18nString {
    question
        .choices
        .get(choice_idx)
        .map(|choice| choice.label.clone())
        .unwrap_or_else(|| I18nString::new("", survey_language_codes))
}

/// Text field `id` of the welcome card, or of the first end screen when
/// `is_ending_card` is set. Blank when the field is unset.
pub fn get_card_text(
    survey: &Survey,
    id: &str,
    is_ending_card: bool,
    survey_language_codes: &[String],
) -> I18nString {
    let value = if is_ending_card {
        survey
            .endings
            .iter()
            .find_map(EndingCard::as_end_screen)
            .and_then(|card| card.text_field(id))
    } else {
        survey.welcome_card.text_field(id)
    };
    value
        .cloned()
        .unwrap_or_else(|| I18nString::new("", survey_language_codes))
}

/// Whether the card at `question_idx` already has an image or video.
///
/// `-1` is the welcome card. Indices from `questions.len()` on address the
/// ending cards in order.
pub fn determine_image_uploader_visibility(question_idx: isize, survey: &Survey) -> bool {
    if question_idx == -1 {
        return survey.welcome_card.has_media();
    }
    let Ok(idx) = usize::try_from(question_idx) else {
        return false;
    };
    match idx.checked_sub(survey.questions.len()) {
        Some(ending_idx) => survey
            .endings
            .get(ending_idx)
            .is_some_and(EndingCard::has_media),
        None => survey.questions.get(idx).is_some_and(Question::has_media),
    }
}

pub fn get_label_by_id(id: &str) -> &'static str {
    match id {
        "headline" => "Question",
        "subheader" => "Description",
        "placeholder" => "Placeholder",
        "buttonLabel" => "\"Next\" Button Label",
        "backButtonLabel" => "\"Back\" Button Label",
        "lowerLabel" => "Lower Label",
        "upperLabel" => "Upper Label",
        _ => "",
    }
}

pub fn get_placeholder_by_id(id: &str) -> &'static str {
    match id {
        "headline" => "Your question here. Recall information with @",
        "subheader" => "Your description here. Recall information with @",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::{Choice, EndScreenCard, QuestionType, RedirectCard, SurveyType};

    fn survey() -> Survey {
        let mut survey = Survey::new("s1", "Feedback", SurveyType::Link);
        let mut question = Question::new(
            "q1",
            QuestionType::MultipleChoiceSingle,
            I18nString::default_only("Pick one"),
        );
        question.choices = vec![
            Choice {
                id: "a".to_string(),
                label: I18nString::default_only("Apples"),
            },
            Choice {
                id: "b".to_string(),
                label: I18nString::default_only("Pears"),
            },
        ];
        survey.questions.push(question);
        survey.questions.push(Question::new(
            "q2",
            QuestionType::OpenText,
            I18nString::default_only("Why?"),
        ));
        survey
    }

    #[test]
    fn test_choice_index_parsing() {
        assert_eq!(get_choice_index("choice-2", true), Some(2));
        assert_eq!(get_choice_index("choice-12abc", true), Some(12));
        assert_eq!(get_choice_index("choice-x", true), None);
        assert_eq!(get_choice_index("choice", true), None);
        assert_eq!(get_choice_index("choice-2", false), None);
    }

    #[test]
    fn test_choice_label_falls_back_to_blank() {
        let survey = survey();
        let codes = vec!["de".to_string()];
        assert_eq!(
            get_choice_label(&survey.questions[0], 1, &codes).localized("default"),
            "Pears"
        );
        let missing = get_choice_label(&survey.questions[0], 5, &codes);
        assert_eq!(missing, I18nString::new("", &codes));
    }

    #[test]
    fn test_card_text_reads_welcome_or_ending() {
        let mut survey = survey();
        survey.welcome_card.headline = Some(I18nString::default_only("Welcome"));
        survey.endings.push(EndingCard::RedirectToUrl(RedirectCard {
            id: "r".to_string(),
            url: None,
            label: None,
        }));
        survey.endings.push(EndingCard::EndScreen(EndScreenCard {
            headline: Some(I18nString::default_only("Bye")),
            ..EndScreenCard::new("e")
        }));

        assert_eq!(get_card_text(&survey, "headline", false, &[]).localized("default"), "Welcome");
        assert_eq!(get_card_text(&survey, "headline", true, &[]).localized("default"), "Bye");
        assert!(get_card_text(&survey, "subheader", true, &[]).is_blank());
    }

    #[test]
    fn test_image_uploader_visibility() {
        let mut survey = survey();
        survey.welcome_card.video_url = Some("https://v".to_string());
        survey.questions[1].image_url = Some("https://img".to_string());
        survey.endings.push(EndingCard::EndScreen(EndScreenCard::new("e")));

        assert!(determine_image_uploader_visibility(-1, &survey));
        assert!(!determine_image_uploader_visibility(0, &survey));
        assert!(determine_image_uploader_visibility(1, &survey));
        assert!(!determine_image_uploader_visibility(2, &survey));

        if let Some(card) = survey.endings[0].as_end_screen_mut() {
            card.image_url = Some("https://end".to_string());
        }
        assert!(determine_image_uploader_visibility(2, &survey));
        assert!(!determine_image_uploader_visibility(3, &survey));
        assert!(!determine_image_uploader_visibility(-4, &survey));
    }

    #[test]
    fn test_labels_and_placeholders() {
        assert_eq!(get_label_by_id("headline"), "Question");
        assert_eq!(get_label_by_id("buttonLabel"), "\"Next\" Button Label");
        assert_eq!(get_label_by_id("backButtonLabel"), "\"Back\" Button Label");
        assert_eq!(get_label_by_id("unknown"), "");
        assert_eq!(
            get_placeholder_by_id("subheader"),
            "Your description here. Recall information with @"
        );
        assert_eq!(get_placeholder_by_id("buttonLabel"), "");
    }
}
