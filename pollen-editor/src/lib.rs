//! Pollen Editor - survey editor view-models
//!
//! Pure state for the survey editor's forms: the survey model, the ending
//! card form, the reorderable question list, the card arrangement picker and
//! the lookup helpers the question inputs share. Nothing here persists; the
//! parent editor applies every change through the callback traits.

pub mod card_arrangement;
pub mod end_screen_form;
pub mod error;
pub mod i18n;
pub mod question_form_input;
pub mod questions_droppable;
pub mod session;
pub mod survey;
pub mod traits;

pub use card_arrangement::{ArrangementIcon, CardArrangement, CardArrangementTabs, TabOption};
pub use end_screen_form::{EndScreenForm, FieldKind, FormField, DEFAULT_CTA_LABEL, DEFAULT_CTA_LINK};
pub use error::{EditorError, EditorResult};
pub use i18n::{localized_value, I18nString, DEFAULT_LANGUAGE};
pub use question_form_input::{
    determine_image_uploader_visibility, get_card_text, get_choice_index, get_choice_label,
    get_label_by_id, get_placeholder_by_id,
};
pub use questions_droppable::{QuestionCardAction, QuestionCardProps, QuestionsDroppable};
pub use session::{EditorSession, EndingUpdater};
pub use survey::{
    Choice, EndScreenCard, EndScreenPatch, EndingCard, Question, QuestionPatch, QuestionType,
    RedirectCard, Survey, SurveyType, WelcomeCard,
};
pub use traits::{EndingCardUpdater, QuestionListHandler};
