//! Callback traits the view-models drive.
//!
//! The parent editor owns the survey; view-models only describe what should
//! change and hand it to one of these.

use crate::error::EditorResult;
use crate::survey::{EndScreenPatch, Question, QuestionPatch};

/// Receives patches for the ending card an [`EndScreenForm`] edits.
///
/// [`EndScreenForm`]: crate::end_screen_form::EndScreenForm
pub trait EndingCardUpdater {
    fn update_survey(&mut self, patch: EndScreenPatch) -> EditorResult<()>;
}

impl<F> EndingCardUpdater for F
where
    F: FnMut(EndScreenPatch) -> EditorResult<()>,
{
    fn update_survey(&mut self, patch: EndScreenPatch) -> EditorResult<()> {
        self(patch)
    }
}

/// Question list operations a [`QuestionsDroppable`] delegates to.
///
/// Indices refer to positions in `survey.questions` at the time of the call.
///
/// [`QuestionsDroppable`]: crate::questions_droppable::QuestionsDroppable
pub trait QuestionListHandler {
    /// Swap the question with its neighbour above (`up`) or below.
    fn move_question(&mut self, index: usize, up: bool) -> EditorResult<()>;

    fn update_question(&mut self, index: usize, patch: QuestionPatch) -> EditorResult<()>;

    fn delete_question(&mut self, index: usize) -> EditorResult<()>;

    /// Insert a copy with a fresh id right after `index`.
    fn duplicate_question(&mut self, index: usize) -> EditorResult<()>;

    /// Insert at `index`, or append when `None`.
    fn add_question(&mut self, question: Question, index: Option<usize>) -> EditorResult<()>;

    fn set_active_question_id(&mut self, question_id: Option<String>);
}
