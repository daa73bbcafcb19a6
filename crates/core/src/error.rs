use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Identifier was well-formed but no record matched it.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Identifier could not be parsed.
    #[error("Invalid {entity} ID: {raw}")]
    InvalidId { entity: &'static str, raw: String },

    /// One message per offending field.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A deal referenced a contact that does not exist.
    #[error("Contact not found: {0}")]
    ContactNotFound(DbId),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure carrying a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::Validation(vec![message.into()])
    }
}
