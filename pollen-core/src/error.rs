//! Error types for Pollen operations

use crate::EntityType;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Unique constraint violated for {entity_type:?}: {key}")]
    UniqueViolation { entity_type: EntityType, key: String },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Failed to decode {entity_type:?} row: {reason}")]
    Decode { entity_type: EntityType, reason: String },

    #[error("Query failed: {reason}")]
    Query { reason: String },

    #[error("Connection failed: {reason}")]
    Connection { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all Pollen service operations.
///
/// Every fallible service call resolves to one of these variants; the API
/// layer maps each one onto a fixed HTTP status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollenError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{}", not_found_message(.resource, .id.as_deref()))]
    ResourceNotFound { resource: String, id: Option<String> },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Unresolved(String),
}

fn not_found_message(resource: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{} with id {} not found", resource, id),
        None => format!("{} not found", resource),
    }
}

impl PollenError {
    /// Not-found error for a resource identified by id.
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        PollenError::ResourceNotFound {
            resource: resource.into(),
            id: Some(id.to_string()),
        }
    }

    /// Not-found error for a resource with no single identifying id.
    pub fn not_found_without_id(resource: impl Into<String>) -> Self {
        PollenError::ResourceNotFound {
            resource: resource.into(),
            id: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        PollenError::InvalidInput(message.into())
    }
}

impl From<StorageError> for PollenError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Decode { entity_type, reason } => {
                tracing::error!(
                    entity_type = entity_type.as_str(),
                    reason = %reason,
                    "Stored row failed validation"
                );
                PollenError::Validation(format!(
                    "Invalid {} data: {}",
                    entity_type.as_str(),
                    reason
                ))
            }
            other => PollenError::Database(other.to_string()),
        }
    }
}

/// Result type alias for Pollen operations.
pub type PollenResult<T> = Result<T, PollenError>;

// =============================================================================
// TESTS
// =============================================================================
