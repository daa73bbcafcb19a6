//! Identifier parsing.
//!
//! Identifiers arrive as path segments (always strings) and inside JSON
//! bodies (numbers, or numeric strings from clients that treat ids as
//! opaque text). Both funnel through [`parse_id`].

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Entity label used in contact-related error messages.
pub const CONTACT_ENTITY: &str = "Contact";

/// Entity label used in deal-related error messages.
pub const DEAL_ENTITY: &str = "Deal";

/// Parse a raw identifier. Only positive integers are well-formed.
pub fn parse_id(entity: &'static str, raw: &str) -> Result<DbId, CoreError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::InvalidId {
            entity,
            raw: raw.to_string(),
        }),
    }
}

/// An identifier as it appears in a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Number(DbId),
    Text(String),
}

impl IdRef {
    pub fn resolve(&self, entity: &'static str) -> Result<DbId, CoreError> {
        match self {
            IdRef::Number(id) if *id > 0 => Ok(*id),
            IdRef::Number(id) => Err(CoreError::InvalidId {
                entity,
                raw: id.to_string(),
            }),
            IdRef::Text(raw) => parse_id(entity, raw),
        }
    }
}

impl From<DbId> for IdRef {
    fn from(id: DbId) -> Self {
        IdRef::Number(id)
    }
}
