//! Editing session that owns a survey and applies view-model callbacks.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::questions_droppable::QuestionsDroppable;
use crate::survey::{EndScreenPatch, Question, QuestionPatch, Survey};
use crate::traits::{EndingCardUpdater, QuestionListHandler};

/// Parent editor state: the local survey copy plus the per-question
/// internal ids the question list keys its cards by.
#[derive(Debug, Clone)]
pub struct EditorSession {
    survey: Survey,
    active_question_id: Option<String>,
    internal_question_id_map: HashMap<String, String>,
    invalid_questions: Vec<String>,
    selected_language_code: String,
}

impl EditorSession {
    pub fn new(survey: Survey) -> Self {
        let internal_question_id_map = survey
            .questions
            .iter()
            .map(|q| (q.id.clone(), fresh_id()))
            .collect();
        Self {
            survey,
            active_question_id: None,
            internal_question_id_map,
            invalid_questions: Vec::new(),
            selected_language_code: crate::i18n::DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn into_survey(self) -> Survey {
        self.survey
    }

    pub fn active_question_id(&self) -> Option<&str> {
        self.active_question_id.as_deref()
    }

    pub fn internal_id(&self, question_id: &str) -> Option<&str> {
        self.internal_question_id_map.get(question_id).map(String::as_str)
    }

    pub fn set_invalid_questions(&mut self, question_ids: Vec<String>) {
        self.invalid_questions = question_ids;
    }

    pub fn set_selected_language_code(&mut self, code: impl Into<String>) {
        self.selected_language_code = code.into();
    }

    pub fn selected_language_code(&self) -> &str {
        &self.selected_language_code
    }

    /// Question list view over the current state.
    pub fn droppable(&self) -> QuestionsDroppable<'_> {
        QuestionsDroppable {
            active_question_id: self.active_question_id.as_deref(),
            invalid_questions: Some(self.invalid_questions.as_slice()),
            selected_language_code: &self.selected_language_code,
            ..QuestionsDroppable::new(&self.survey, &self.internal_question_id_map)
        }
    }

    pub fn update_ending(&mut self, index: usize, patch: EndScreenPatch) -> EditorResult<()> {
        self.survey.end_screen_mut(index)?.apply(patch);
        debug!(ending_card_index = index, "Updated ending card");
        Ok(())
    }

    /// Updater bound to one ending card, for an `EndScreenForm`.
    pub fn ending_updater(&mut self, index: usize) -> EndingUpdater<'_> {
        EndingUpdater {
            session: self,
            index,
        }
    }

    fn ensure_new_id(&self, id: &str) -> EditorResult<()> {
        if id.trim().is_empty() {
            return Err(EditorError::InvalidQuestionId(id.to_string()));
        }
        if self.survey.has_question_id(id) {
            return Err(EditorError::DuplicateQuestionId(id.to_string()));
        }
        Ok(())
    }
}

/// [`EndingCardUpdater`] that writes into one ending card of a session.
pub struct EndingUpdater<'a> {
    session: &'a mut EditorSession,
    index: usize,
}

impl EndingCardUpdater for EndingUpdater<'_> {
    fn update_survey(&mut self, patch: EndScreenPatch) -> EditorResult<()> {
        self.session.update_ending(self.index, patch)
    }
}

impl QuestionListHandler for EditorSession {
    fn move_question(&mut self, index: usize, up: bool) -> EditorResult<()> {
        self.survey.question(index)?;
        let target = if up {
            index.checked_sub(1)
        } else {
            Some(index + 1).filter(|t| *t < self.survey.questions.len())
        };
        // Moving past either end leaves the order unchanged.
        if let Some(target) = target {
            self.survey.questions.swap(index, target);
            debug!(from = index, to = target, "Moved question");
        }
        Ok(())
    }

    fn update_question(&mut self, index: usize, patch: QuestionPatch) -> EditorResult<()> {
        let old_id = self.survey.question(index)?.id.clone();
        let new_id = patch.id.clone().filter(|id| *id != old_id);
        if let Some(new_id) = &new_id {
            self.ensure_new_id(new_id)?;
        }

        patch.apply_to(self.survey.question_mut(index)?);

        if let Some(new_id) = new_id {
            if let Some(internal) = self.internal_question_id_map.remove(&old_id) {
                self.internal_question_id_map.insert(new_id.clone(), internal);
            }
            if self.active_question_id.as_deref() == Some(old_id.as_str()) {
                self.active_question_id = Some(new_id.clone());
            }
            debug!(old_id = %old_id, new_id = %new_id, "Renamed question");
        }
        Ok(())
    }

    fn delete_question(&mut self, index: usize) -> EditorResult<()> {
        self.survey.question(index)?;
        let removed = self.survey.questions.remove(index);
        self.internal_question_id_map.remove(&removed.id);
        self.invalid_questions.retain(|id| *id != removed.id);

        if self.active_question_id.as_deref() == Some(removed.id.as_str()) {
            // Focus moves to the question that took its place, or the new last one.
            self.active_question_id = self
                .survey
                .questions
                .get(index)
                .or_else(|| self.survey.questions.last())
                .map(|q| q.id.clone());
        }
        debug!(question_id = %removed.id, "Deleted question");
        Ok(())
    }

    fn duplicate_question(&mut self, index: usize) -> EditorResult<()> {
        let mut copy = self.survey.question(index)?.clone();
        copy.id = fresh_id();
        let copy_id = copy.id.clone();
        self.survey.questions.insert(index + 1, copy);
        self.internal_question_id_map.insert(copy_id.clone(), fresh_id());
        debug!(source_index = index, question_id = %copy_id, "Duplicated question");
        self.active_question_id = Some(copy_id);
        Ok(())
    }

    fn add_question(&mut self, question: Question, index: Option<usize>) -> EditorResult<()> {
        self.ensure_new_id(&question.id)?;
        let len = self.survey.questions.len();
        let position = match index {
            Some(idx) if idx > len => {
                return Err(EditorError::QuestionIndexOutOfRange { index: idx, len });
            }
            Some(idx) => idx,
            None => len,
        };
        let question_id = question.id.clone();
        self.survey.questions.insert(position, question);
        self.internal_question_id_map.insert(question_id.clone(), fresh_id());
        debug!(question_id = %question_id, position, "Added question");
        self.active_question_id = Some(question_id);
        Ok(())
    }

    fn set_active_question_id(&mut self, question_id: Option<String>) {
        self.active_question_id = question_id;
    }
}

fn fresh_id() -> String {
    Uuid::now_v7().simple().to_string()
}
