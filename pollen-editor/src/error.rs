//! Error types for editor operations.

use thiserror::Error;

/// Errors raised when an editor action does not fit the survey it targets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("Question index {index} out of range (survey has {len} questions)")]
    QuestionIndexOutOfRange { index: usize, len: usize },

    #[error("Ending card index {index} out of range (survey has {len} ending cards)")]
    EndingIndexOutOfRange { index: usize, len: usize },

    #[error("Ending card {index} is not an end screen")]
    NotAnEndScreen { index: usize },

    #[error("Question id already in use: {0}")]
    DuplicateQuestionId(String),

    #[error("Invalid question id: {0:?}")]
    InvalidQuestionId(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
