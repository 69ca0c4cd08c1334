//! Request extractors.

mod caller;
mod path_id;

pub use caller::{CallerId, USER_ID_HEADER};
pub use path_id::{PathId, PathIdError};
