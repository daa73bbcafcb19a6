//! Contact constants, request payloads, and validation.
//!
//! Payload structs deserialize with every field optional so that a missing
//! required field surfaces as a field-level validation message instead of a
//! deserialization failure.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::CoreError;
use crate::fields::{clean, FieldErrors};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_COMPANY_LENGTH: usize = 100;
pub const MAX_ROLE_LENGTH: usize = 50;
pub const MAX_ASSIGNEE_LENGTH: usize = 100;
pub const MAX_NOTES_LENGTH: usize = 1000;
pub const MAX_TAG_LENGTH: usize = 30;

pub const DEFAULT_LEAD_SOURCE: &str = "Other";
pub const DEFAULT_STATUS: &str = "New";

/// Accepted values for `leadSource`.
pub const LEAD_SOURCES: &[&str] = &[
    "Website",
    "Social Media",
    "Email Campaign",
    "Campaign",
    "Cold Call",
    "Referral",
    "Event",
    "Advertisement",
    "Direct Mail",
    "LinkedIn",
    "Google Ads",
    "Facebook Ads",
    "Trade Show",
    "Webinar",
    "Other",
];

/// Accepted values for contact `status`.
pub const CONTACT_STATUSES: &[&str] = &[
    "New",
    "Contacted",
    "Qualified",
    "Proposal",
    "Negotiation",
    "Closed Won",
    "Lost",
    "On Hold",
];

/// Message returned when an email collides with an existing contact.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Contact with this email already exists";

// ASCII letters and digits only.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$")
        .expect("email pattern compiles")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

// ---------------------------------------------------------------------------
// Create / full update
// ---------------------------------------------------------------------------

/// Request body for creating or fully replacing a contact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub assign_employee: Option<String>,
    pub assign_manager: Option<String>,
    pub lead_source: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A normalized, validated contact ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    /// Lowercased.
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub assign_employee: Option<String>,
    pub assign_manager: Option<String>,
    pub lead_source: String,
    pub status: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl ContactInput {
    /// Normalize and validate. Omitted enumerations take their defaults.
    pub fn validate(self) -> Result<NewContact, CoreError> {
        let mut errors = FieldErrors::new();

        let name = errors.require(clean(self.name), "Name is required");
        errors.max_len(
            name.as_deref(),
            MAX_NAME_LENGTH,
            "Name cannot exceed 100 characters",
        );

        let email = errors.require(
            clean(self.email).map(|e| e.to_lowercase()),
            "Email is required",
        );
        if let Some(e) = email.as_deref() {
            if !is_valid_email(e) {
                errors.push("Please enter a valid email address");
            }
        }

        let phone = errors.require(clean(self.phone), "Phone number is required");
        if let Some(p) = phone.as_deref() {
            if !is_valid_phone(p) {
                errors.push("Please enter a valid phone number");
            }
        }

        let company = clean(self.company);
        errors.max_len(
            company.as_deref(),
            MAX_COMPANY_LENGTH,
            "Company name cannot exceed 100 characters",
        );
        let role = clean(self.role);
        errors.max_len(
            role.as_deref(),
            MAX_ROLE_LENGTH,
            "Role cannot exceed 50 characters",
        );
        let assign_employee = clean(self.assign_employee);
        errors.max_len(
            assign_employee.as_deref(),
            MAX_ASSIGNEE_LENGTH,
            "Employee name cannot exceed 100 characters",
        );
        let assign_manager = clean(self.assign_manager);
        errors.max_len(
            assign_manager.as_deref(),
            MAX_ASSIGNEE_LENGTH,
            "Manager name cannot exceed 100 characters",
        );

        let lead_source = clean(self.lead_source).unwrap_or_else(|| DEFAULT_LEAD_SOURCE.into());
        errors.one_of(&lead_source, LEAD_SOURCES, "leadSource");
        let status = clean(self.status).unwrap_or_else(|| DEFAULT_STATUS.into());
        errors.one_of(&status, CONTACT_STATUSES, "status");

        let notes = clean(self.notes);
        errors.max_len(
            notes.as_deref(),
            MAX_NOTES_LENGTH,
            "Notes cannot exceed 1000 characters",
        );

        let tags = normalize_tags(self.tags.unwrap_or_default());
        if tags.iter().any(|t| t.chars().count() > MAX_TAG_LENGTH) {
            errors.push("Each tag cannot exceed 30 characters");
        }

        errors.finish(|| NewContact {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            company,
            role,
            assign_employee,
            assign_manager,
            lead_source,
            status,
            notes,
            tags,
        })
    }
}

/// Trim each tag and drop blanks, keeping order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Role assignment
// ---------------------------------------------------------------------------

/// Request body for `PATCH /api/contacts/{id}/assign`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentInput {
    pub assign_employee: Option<String>,
    pub assign_manager: Option<String>,
}

/// Validated role assignment.
///
/// The outer `Option` says whether the field was supplied; the inner one is
/// the new value, where a blank string clears the assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleAssignment {
    pub assign_employee: Option<Option<String>>,
    pub assign_manager: Option<Option<String>>,
}

impl RoleAssignmentInput {
    pub fn validate(self) -> Result<RoleAssignment, CoreError> {
        let mut errors = FieldErrors::new();

        let assign_employee = self.assign_employee.map(|v| clean(Some(v)));
        errors.max_len(
            assign_employee.as_ref().and_then(|v| v.as_deref()),
            MAX_ASSIGNEE_LENGTH,
            "Employee name cannot exceed 100 characters",
        );
        let assign_manager = self.assign_manager.map(|v| clean(Some(v)));
        errors.max_len(
            assign_manager.as_ref().and_then(|v| v.as_deref()),
            MAX_ASSIGNEE_LENGTH,
            "Manager name cannot exceed 100 characters",
        );

        errors.finish(|| RoleAssignment {
            assign_employee,
            assign_manager,
        })
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Request body for recording attachment metadata on a contact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInput {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

impl AttachmentInput {
    pub fn validate(self) -> Result<NewAttachment, CoreError> {
        let mut errors = FieldErrors::new();
        let file_name = errors.require(clean(self.file_name), "File name is required");
        let file_path = errors.require(clean(self.file_path), "File path is required");
        if matches!(self.file_size, Some(size) if size < 0) {
            errors.push("File size cannot be negative");
        }

        errors.finish(|| NewAttachment {
            file_name: file_name.unwrap_or_default(),
            file_path: file_path.unwrap_or_default(),
            file_size: self.file_size,
            file_type: clean(self.file_type),
        })
    }
}
