//! Reorderable question list of the survey editor.

use std::collections::HashMap;

use crate::error::EditorResult;
use crate::survey::{Question, QuestionPatch, Survey};
use crate::traits::QuestionListHandler;

/// Everything one question card needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCardProps<'a> {
    /// Stable identity across id edits, used for list reconciliation.
    pub key: &'a str,
    pub question: &'a Question,
    pub question_idx: usize,
    pub last_question: bool,
    pub is_invalid: bool,
    pub is_active: bool,
    pub selected_language_code: &'a str,
    pub is_cx_mode: bool,
    pub is_cloud: bool,
}

/// User action on a question card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionCardAction {
    Move { index: usize, up: bool },
    Update { index: usize, patch: QuestionPatch },
    Delete { index: usize },
    Duplicate { index: usize },
    Add { question: Question, index: Option<usize> },
    Activate { question_id: Option<String> },
}

impl QuestionCardAction {
    pub fn dispatch<H>(self, handler: &mut H) -> EditorResult<()>
    where
        H: QuestionListHandler + ?Sized,
    {
        match self {
            QuestionCardAction::Move { index, up } => handler.move_question(index, up),
            QuestionCardAction::Update { index, patch } => handler.update_question(index, patch),
            QuestionCardAction::Delete { index } => handler.delete_question(index),
            QuestionCardAction::Duplicate { index } => handler.duplicate_question(index),
            QuestionCardAction::Add { question, index } => handler.add_question(question, index),
            QuestionCardAction::Activate { question_id } => {
                handler.set_active_question_id(question_id);
                Ok(())
            }
        }
    }
}

/// Read-only view over the survey's questions. All changes go through a
/// [`QuestionListHandler`].
#[derive(Debug, Clone, Copy)]
pub struct QuestionsDroppable<'a> {
    pub survey: &'a Survey,
    pub active_question_id: Option<&'a str>,
    pub invalid_questions: Option<&'a [String]>,
    pub internal_question_id_map: &'a HashMap<String, String>,
    pub selected_language_code: &'a str,
    pub is_cx_mode: bool,
    pub is_cloud: bool,
}

impl<'a> QuestionsDroppable<'a> {
    pub fn new(survey: &'a Survey, internal_question_id_map: &'a HashMap<String, String>) -> Self {
        Self {
            survey,
            active_question_id: None,
            invalid_questions: None,
            internal_question_id_map,
            selected_language_code: crate::i18n::DEFAULT_LANGUAGE,
            is_cx_mode: false,
            is_cloud: false,
        }
    }

    pub fn cards(&self) -> Vec<QuestionCardProps<'a>> {
        let count = self.survey.questions.len();
        self.survey
            .questions
            .iter()
            .enumerate()
            .map(|(question_idx, question)| QuestionCardProps {
                key: self
                    .internal_question_id_map
                    .get(&question.id)
                    .map(String::as_str)
                    .unwrap_or(question.id.as_str()),
                question,
                question_idx,
                last_question: question_idx + 1 == count,
                is_invalid: self
                    .invalid_questions
                    .is_some_and(|ids| ids.contains(&question.id)),
                is_active: self.active_question_id == Some(question.id.as_str()),
                selected_language_code: self.selected_language_code,
                is_cx_mode: self.is_cx_mode,
                is_cloud: self.is_cloud,
            })
            .collect()
    }

    /// Question ids in list order, as registered with the sortable context.
    pub fn sortable_items(&self) -> Vec<&'a str> {
        self.survey.questions.iter().map(|q| q.id.as_str()).collect()
    }

    /// Route a card action to the handler. Takes no `self` since the handler
    /// usually owns the survey this view borrows.
    pub fn dispatch<H>(action: QuestionCardAction, handler: &mut H) -> EditorResult<()>
    where
        H: QuestionListHandler + ?Sized,
    {
        action.dispatch(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::I18nString;
    use crate::survey::{QuestionType, SurveyType};

    fn survey(ids: &[&str]) -> Survey {
        let mut survey = Survey::new("s", "S", SurveyType::App);
        for id in ids {
            survey.questions.push(Question::new(
                *id,
                QuestionType::OpenText,
                I18nString::default_only(id),
            ));
        }
        survey
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl QuestionListHandler for Recorder {
        fn move_question(&mut self, index: usize, up: bool) -> EditorResult<()> {
            self.calls.push(format!("move {} {}", index, up));
            Ok(())
        }
        fn update_question(&mut self, index: usize, _patch: QuestionPatch) -> EditorResult<()> {
            self.calls.push(format!("update {}", index));
            Ok(())
        }
        fn delete_question(&mut self, index: usize) -> EditorResult<()> {
            self.calls.push(format!("delete {}", index));
            Ok(())
        }
        fn duplicate_question(&mut self, index: usize) -> EditorResult<()> {
            self.calls.push(format!("duplicate {}", index));
            Ok(())
        }
        fn add_question(&mut self, question: Question, index: Option<usize>) -> EditorResult<()> {
            self.calls.push(format!("add {} {:?}", question.id, index));
            Ok(())
        }
        fn set_active_question_id(&mut self, question_id: Option<String>) {
            self.calls.push(format!("activate {:?}", question_id));
        }
    }

    #[test]
    fn test_cards_flags() {
        let survey = survey(&["q1", "q2", "q3"]);
        let mut map = HashMap::new();
        map.insert("q1".to_string(), "internal-1".to_string());
        let invalid = vec!["q2".to_string()];
        let view = QuestionsDroppable {
            active_question_id: Some("q3"),
            invalid_questions: Some(invalid.as_slice()),
            ..QuestionsDroppable::new(&survey, &map)
        };

        let cards = view.cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].key, "internal-1");
        assert_eq!(cards[1].key, "q2");
        assert!(cards[1].is_invalid);
        assert!(!cards[0].is_invalid);
        assert!(cards[2].is_active && cards[2].last_question);
        assert!(!cards[1].last_question);
        assert_eq!(cards[2].question_idx, 2);
    }

    #[test]
    fn test_no_invalid_list_means_all_valid() {
        let survey = survey(&["q1"]);
        let map = HashMap::new();
        let view = QuestionsDroppable::new(&survey, &map);
        assert!(!view.cards()[0].is_invalid);
        assert_eq!(view.sortable_items(), vec!["q1"]);
    }

    #[test]
    fn test_empty_survey_has_no_cards() {
        let survey = survey(&[]);
        let map = HashMap::new();
        assert!(QuestionsDroppable::new(&survey, &map).cards().is_empty());
    }

    #[test]
    fn test_dispatch_routes_each_action() -> EditorResult<()> {
        let mut recorder = Recorder::default();
        let actions = vec![
            QuestionCardAction::Move { index: 1, up: true },
            QuestionCardAction::Update {
                index: 0,
                patch: QuestionPatch::default(),
            },
            QuestionCardAction::Delete { index: 2 },
            QuestionCardAction::Duplicate { index: 0 },
            QuestionCardAction::Add {
                question: Question::new("q9", QuestionType::Nps, I18nString::default()),
                index: Some(1),
            },
            QuestionCardAction::Activate { question_id: None },
        ];
        for action in actions {
            QuestionsDroppable::dispatch(action, &mut recorder)?;
        }
        assert_eq!(
            recorder.calls,
            vec![
                "move 1 true",
                "update 0",
                "delete 2",
                "duplicate 0",
                "add q9 Some(1)",
                "activate None",
            ]
        );
        Ok(())
    }
}
