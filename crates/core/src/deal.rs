//! Deal constants, request payloads, validation, and filter criteria.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fields::{clean, FieldErrors};
use crate::ids::{IdRef, CONTACT_ENTITY};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_PERSON_LENGTH: usize = 100;
pub const MAX_COMPANY_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_NOTES_LENGTH: usize = 2000;

pub const DEFAULT_STAGE: &str = "Lead";
pub const DEFAULT_PRIORITY: &str = "Medium";
pub const DEFAULT_STATUS: &str = "Active";
pub const DEFAULT_PROBABILITY: f64 = 50.0;

/// Pipeline columns. Any stage may move to any other.
pub const DEAL_STAGES: &[&str] = &[
    "Lead",
    "Prospect",
    "Proposal",
    "Negotiation",
    "Closed Won",
    "Closed Lost",
    "On Hold",
];

pub const DEAL_PRIORITIES: &[&str] = &["Low", "Medium", "High", "Critical"];

pub const DEAL_STATUSES: &[&str] = &["Active", "Won", "Lost", "Pending", "Cancelled"];

// ---------------------------------------------------------------------------
// Single-field checks shared by full and partial updates
// ---------------------------------------------------------------------------

/// Validate a stage value supplied on its own (stage patch, move).
pub fn validate_stage(stage: Option<String>) -> Result<String, CoreError> {
    let mut errors = FieldErrors::new();
    let stage = errors.require(clean(stage), "Deal stage is required");
    if let Some(s) = stage.as_deref() {
        errors.one_of(s, DEAL_STAGES, "stage");
    }
    errors.finish(|| stage.unwrap_or_default())
}

/// Validate a priority value supplied on its own.
pub fn validate_priority(priority: Option<String>) -> Result<String, CoreError> {
    let mut errors = FieldErrors::new();
    let priority = errors.require(clean(priority), "Deal priority is required");
    if let Some(p) = priority.as_deref() {
        errors.one_of(p, DEAL_PRIORITIES, "priority");
    }
    errors.finish(|| priority.unwrap_or_default())
}

fn check_probability(errors: &mut FieldErrors, probability: f64) {
    if !probability.is_finite() {
        errors.push("Probability must be a number");
    } else if probability < 0.0 {
        errors.push("Probability cannot be less than 0");
    } else if probability > 100.0 {
        errors.push("Probability cannot exceed 100");
    }
}

/// Parse a close date. Accepts RFC 3339 timestamps and bare `YYYY-MM-DD`
/// dates (taken as midnight UTC).
pub fn parse_close_date(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&chrono::Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

// ---------------------------------------------------------------------------
// Create / full update
// ---------------------------------------------------------------------------

/// Request body for creating or fully replacing a deal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInput {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub stage: Option<String>,
    pub priority: Option<String>,
    pub executive: Option<String>,
    pub manager: Option<String>,
    pub associated_company: Option<String>,
    pub associated_contacts: Option<Vec<IdRef>>,
    pub contact_id: Option<IdRef>,
    pub close_date: Option<String>,
    pub status: Option<String>,
    pub probability: Option<f64>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Validated deal fields, excluding the primary contact which is resolved
/// against the contact store separately.
#[derive(Debug, Clone, PartialEq)]
pub struct DealFields {
    pub title: String,
    pub amount: f64,
    pub stage: String,
    pub priority: String,
    pub executive: String,
    pub manager: String,
    pub associated_company: String,
    pub associated_contacts: Vec<DbId>,
    pub close_date: Timestamp,
    pub status: String,
    pub probability: f64,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl DealInput {
    /// The primary contact id, if the payload carries one.
    pub fn contact_id(&self) -> Result<Option<DbId>, CoreError> {
        self.contact_id
            .as_ref()
            .map(|id| id.resolve(CONTACT_ENTITY))
            .transpose()
    }

    /// Validate a create payload, where `contactId` is required.
    ///
    /// A malformed id fails on its own with `InvalidId`. A missing one is
    /// reported alongside every other field error.
    pub fn validate_new(self) -> Result<(DbId, DealFields), CoreError> {
        const MISSING_CONTACT: &str = "Primary contact ID is required";

        match (self.contact_id()?, self.validate()) {
            (Some(contact_id), fields) => Ok((contact_id, fields?)),
            (None, Ok(_)) => Err(CoreError::invalid(MISSING_CONTACT)),
            (None, Err(CoreError::Validation(mut msgs))) => {
                msgs.push(MISSING_CONTACT.into());
                Err(CoreError::Validation(msgs))
            }
            (None, Err(other)) => Err(other),
        }
    }

    /// Normalize and validate everything except `contactId`.
    pub fn validate(self) -> Result<DealFields, CoreError> {
        let mut errors = FieldErrors::new();

        let title = errors.require(clean(self.title), "Deal title is required");
        errors.max_len(
            title.as_deref(),
            MAX_TITLE_LENGTH,
            "Title cannot exceed 200 characters",
        );

        let amount = errors.require(self.amount, "Deal amount is required");
        match amount {
            Some(a) if !a.is_finite() => errors.push("Deal amount must be a number"),
            Some(a) if a < 0.0 => errors.push("Amount cannot be negative"),
            _ => {}
        }

        let stage = clean(self.stage).unwrap_or_else(|| DEFAULT_STAGE.into());
        errors.one_of(&stage, DEAL_STAGES, "stage");
        let priority = clean(self.priority).unwrap_or_else(|| DEFAULT_PRIORITY.into());
        errors.one_of(&priority, DEAL_PRIORITIES, "priority");
        let status = clean(self.status).unwrap_or_else(|| DEFAULT_STATUS.into());
        errors.one_of(&status, DEAL_STATUSES, "status");

        let executive = errors.require(clean(self.executive), "Executive is required");
        errors.max_len(
            executive.as_deref(),
            MAX_PERSON_LENGTH,
            "Executive name cannot exceed 100 characters",
        );
        let manager = errors.require(clean(self.manager), "Manager is required");
        errors.max_len(
            manager.as_deref(),
            MAX_PERSON_LENGTH,
            "Manager name cannot exceed 100 characters",
        );
        let associated_company = errors.require(
            clean(self.associated_company),
            "Associated company is required",
        );
        errors.max_len(
            associated_company.as_deref(),
            MAX_COMPANY_LENGTH,
            "Company name cannot exceed 200 characters",
        );

        let mut associated_contacts: Vec<DbId> = Vec::new();
        for raw in self.associated_contacts.unwrap_or_default() {
            match raw.resolve(CONTACT_ENTITY) {
                Ok(id) if !associated_contacts.contains(&id) => associated_contacts.push(id),
                Ok(_) => {}
                Err(_) => {
                    errors.push("Associated contacts must be valid contact IDs");
                    break;
                }
            }
        }

        let close_date = match clean(self.close_date) {
            None => {
                errors.push("Expected close date is required");
                None
            }
            Some(raw) => {
                let parsed = parse_close_date(&raw);
                if parsed.is_none() {
                    errors.push("Expected close date must be a valid date");
                }
                parsed
            }
        };

        let probability = self.probability.unwrap_or(DEFAULT_PROBABILITY);
        check_probability(&mut errors, probability);

        let description = clean(self.description);
        errors.max_len(
            description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
            "Description cannot exceed 1000 characters",
        );
        let notes = clean(self.notes);
        errors.max_len(
            notes.as_deref(),
            MAX_NOTES_LENGTH,
            "Notes cannot exceed 2000 characters",
        );

        errors.finish(|| DealFields {
            title: title.unwrap_or_default(),
            amount: amount.unwrap_or_default(),
            stage,
            priority,
            executive: executive.unwrap_or_default(),
            manager: manager.unwrap_or_default(),
            associated_company: associated_company.unwrap_or_default(),
            associated_contacts,
            close_date: close_date.unwrap_or_default(),
            status,
            probability,
            description,
            notes,
        })
    }
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// Request body for `POST /api/deals/{id}/move`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageMoveInput {
    pub stage: Option<String>,
    pub probability: Option<f64>,
}

/// A validated stage transition. `probability` is `None` when the client
/// did not supply one, in which case the stored value is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMove {
    pub stage: String,
    pub probability: Option<f64>,
}

impl StageMoveInput {
    pub fn validate(self) -> Result<StageMove, CoreError> {
        let mut errors = FieldErrors::new();
        let stage = match validate_stage(self.stage) {
            Ok(stage) => Some(stage),
            Err(CoreError::Validation(msgs)) => {
                msgs.into_iter().for_each(|m| errors.push(m));
                None
            }
            Err(other) => return Err(other),
        };
        if let Some(p) = self.probability {
            check_probability(&mut errors, p);
        }
        errors.finish(|| StageMove {
            stage: stage.unwrap_or_default(),
            probability: self.probability,
        })
    }
}

/// Request body for `PATCH /api/deals/{id}/stage`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageInput {
    pub stage: Option<String>,
}

/// Request body for `PATCH /api/deals/{id}/priority`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriorityInput {
    pub priority: Option<String>,
}

/// Request body for `PATCH /api/deals/{id}/assign`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealAssignmentInput {
    pub executive: Option<String>,
    pub manager: Option<String>,
}

/// Validated deal assignment. Blank or missing values are dropped, so a
/// field is only written when it carries a real name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealAssignment {
    pub executive: Option<String>,
    pub manager: Option<String>,
}

impl DealAssignmentInput {
    pub fn validate(self) -> Result<DealAssignment, CoreError> {
        let mut errors = FieldErrors::new();
        let executive = clean(self.executive);
        errors.max_len(
            executive.as_deref(),
            MAX_PERSON_LENGTH,
            "Executive name cannot exceed 100 characters",
        );
        let manager = clean(self.manager);
        errors.max_len(
            manager.as_deref(),
            MAX_PERSON_LENGTH,
            "Manager name cannot exceed 100 characters",
        );
        errors.finish(|| DealAssignment { executive, manager })
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Criteria for `GET /api/deals/filter`. Every set option narrows the
/// result (logical AND); unset or blank options are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DealFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Case-insensitive substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive: Option<String>,
    /// Case-insensitive substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
}

impl DealFilter {
    /// Drop blank criteria.
    pub fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            stage: keep(self.stage),
            priority: keep(self.priority),
            status: keep(self.status),
            executive: keep(self.executive),
            manager: keep(self.manager),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stage.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.executive.is_none()
            && self.manager.is_none()
    }
}

/// Build an `ILIKE` pattern that matches `needle` anywhere, treating
/// `%`, `_` and `\` in the user text literally.
pub fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
