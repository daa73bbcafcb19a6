//! Deal row model, the contact-joined response view, and analytics rows.

use crm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::contact::ContactRef;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `deals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DbId,
    pub title: String,
    pub amount: f64,
    pub stage: String,
    pub priority: String,
    pub executive: String,
    pub manager: String,
    pub associated_company: String,
    pub associated_contacts: Vec<DbId>,
    pub contact_id: DbId,
    pub close_date: Timestamp,
    pub status: String,
    pub probability: f64,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Which contact fields a deal response inlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactProjection {
    /// `{id, name, email, company}`; list, filter and write responses.
    Summary,
    /// Adds `phone` and `role`; single-deal view.
    Detail,
}

/// A deal with its contacts joined in at read time.
///
/// `contact` is `None` when the referenced contact has since been deleted;
/// `contactId` still carries the stored identifier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealView {
    #[serde(flatten)]
    pub deal: Deal,
    pub contact: Option<ContactRef>,
    pub associated_contact_details: Vec<ContactRef>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// One `GROUP BY stage` bucket.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBreakdown {
    pub stage: String,
    pub count: i64,
    pub total_amount: f64,
    pub avg_probability: f64,
}

/// One `GROUP BY priority` bucket.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub priority: String,
    pub count: i64,
    pub total_amount: f64,
}

/// One `GROUP BY status` bucket.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub status: String,
    pub count: i64,
    pub total_amount: f64,
}

/// Collection-wide totals. All zeros for an empty collection.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSummary {
    pub total_deals: i64,
    pub total_value: f64,
    pub avg_amount: f64,
    pub avg_probability: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineBreakdown {
    pub by_stage: Vec<StageBreakdown>,
    pub by_priority: Vec<PriorityBreakdown>,
    pub by_status: Vec<StatusBreakdown>,
}

/// Response payload for `GET /api/deals/analytics`.
#[derive(Debug, Clone, Serialize)]
pub struct DealAnalytics {
    pub pipeline: PipelineBreakdown,
    pub summary: DealSummary,
}
