//! Input validation
//!
//! Boundary checks every service runs before touching storage.

use crate::{EntityId, PollenError, PollenResult};
use uuid::Uuid;

/// Reject the nil UUID, which is never a valid row id.
pub fn ensure_id(id: EntityId, field_name: &str) -> PollenResult<EntityId> {
    if id.is_nil() {
        return Err(PollenError::InvalidInput(format!(
            "{} must be a valid id",
            field_name
        )));
    }
    Ok(id)
}

/// Parse a textual id and reject malformed or nil values.
pub fn parse_id(raw: &str, field_name: &str) -> PollenResult<EntityId> {
    let id = Uuid::parse_str(raw.trim()).map_err(|_| {
        PollenError::InvalidInput(format!("{} must be a valid id, got '{}'", field_name, raw))
    })?;
    ensure_id(id, field_name)
}

/// Trait for validating non-empty strings.
///
/// # Example
/// ```
/// use pollen_core::ValidateNonEmpty;
///
/// assert!("Support".validate_non_empty("Team name must be at least 1 character long").is_ok());
/// assert!("".validate_non_empty("Team name must be at least 1 character long").is_err());
/// ```
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `PollenError::InvalidInput(message)` if the value is empty or
    /// whitespace-only.
    fn validate_non_empty(&self, message: &str) -> PollenResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, message: &str) -> PollenResult<()> {
        if self.trim().is_empty() {
            return Err(PollenError::InvalidInput(message.to_string()));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, message: &str) -> PollenResult<()> {
        (*self).validate_non_empty(message)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, message: &str) -> PollenResult<()> {
        self.as_str().validate_non_empty(message)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, message: &str) -> PollenResult<()> {
        match self {
            Some(value) => value.validate_non_empty(message),
            None => Err(PollenError::InvalidInput(message.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;

    #[test]
    fn test_ensure_id_rejects_nil() {
        let err = ensure_id(Uuid::nil(), "team_id").unwrap_err();
        assert!(matches!(err, PollenError::InvalidInput(ref msg) if msg.contains("team_id")));

        let id = new_entity_id();
        assert_eq!(ensure_id(id, "team_id"), Ok(id));
    }

    #[test]
    fn test_parse_id() {
        let id = new_entity_id();
        assert_eq!(parse_id(&id.to_string(), "user_id"), Ok(id));
        assert!(parse_id("not-a-uuid", "user_id").is_err());
        assert!(parse_id("00000000-0000-0000-0000-000000000000", "user_id").is_err());
    }

    #[test]
    fn test_validate_non_empty() {
        assert!("Support".validate_non_empty("name required").is_ok());
        assert_eq!(
            "   ".validate_non_empty("name required"),
            Err(PollenError::InvalidInput("name required".to_string()))
        );
        let missing: Option<String> = None;
        assert!(missing.validate_non_empty("name required").is_err());
    }
}
