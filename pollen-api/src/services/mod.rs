//! Service Layer
//!
//! Business logic for teams, environments, and organizations. Every service
//! validates its inputs, reads through the shared [`MemoCache`], and
//! revalidates the tags a mutation touched before returning.
//!
//! [`MemoCache`]: pollen_storage::MemoCache

mod environment_service;
mod organization_service;
mod team_service;

pub use environment_service::*;
pub use organization_service::*;
pub use team_service::*;
