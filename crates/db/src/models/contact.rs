//! Contact row model and the reduced projection embedded in deal responses.

use crm_core::contact::NewAttachment;
use crm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub assign_employee: Option<String>,
    pub assign_manager: Option<String>,
    pub lead_source: String,
    pub status: String,
    pub last_activity: Timestamp,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub attachments: Json<Vec<Attachment>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Attachment metadata stored in the `attachments` JSONB array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub uploaded_at: Timestamp,
}

impl Attachment {
    pub fn new(input: NewAttachment, uploaded_at: Timestamp) -> Self {
        Self {
            file_name: input.file_name,
            file_path: input.file_path,
            file_size: input.file_size,
            file_type: input.file_type,
            uploaded_at,
        }
    }
}

/// Contact fields inlined into deal responses.
///
/// `phone` and `role` are only populated for the single-deal view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactRef {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ContactRef {
    /// Drop the extended fields, leaving `{id, name, email, company}`.
    pub fn summary(self) -> Self {
        Self {
            phone: None,
            role: None,
            ..self
        }
    }
}
