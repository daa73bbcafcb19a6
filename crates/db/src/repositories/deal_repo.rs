//! Repository for the `deals` table.
//!
//! Provides deal CRUD, the single-field patches used by the pipeline board,
//! criteria filtering, analytics aggregation, and the read-time contact join.

use std::collections::HashMap;

use crm_core::deal::{contains_pattern, DealAssignment, DealFields, DealFilter, StageMove};
use crm_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::ContactRef;
use crate::models::deal::{
    ContactProjection, Deal, DealAnalytics, DealSummary, DealView, PipelineBreakdown,
    PriorityBreakdown, StageBreakdown, StatusBreakdown,
};
use crate::repositories::ContactRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, title, amount, stage, priority, executive, manager, associated_company, \
    associated_contacts, contact_id, close_date, status, probability, \
    description, notes, created_at, updated_at";

/// Provides CRUD, filtering and aggregation for deals.
pub struct DealRepo;

impl DealRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a new deal. The caller has already confirmed `contact_id`
    /// resolves to a contact.
    pub async fn create(
        pool: &PgPool,
        input: &DealFields,
        contact_id: DbId,
    ) -> Result<Deal, sqlx::Error> {
        let query = format!(
            "INSERT INTO deals \
                (title, amount, stage, priority, executive, manager, associated_company, \
                 associated_contacts, contact_id, close_date, status, probability, \
                 description, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(&input.title)
            .bind(input.amount)
            .bind(&input.stage)
            .bind(&input.priority)
            .bind(&input.executive)
            .bind(&input.manager)
            .bind(&input.associated_company)
            .bind(&input.associated_contacts)
            .bind(contact_id)
            .bind(input.close_date)
            .bind(&input.status)
            .bind(input.probability)
            .bind(&input.description)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// List all deals, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Deal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deals ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Deal>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deals WHERE id = $1");
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace every mutable field. `contact_id = None` keeps the stored
    /// primary contact.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        input: &DealFields,
        contact_id: Option<DbId>,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!(
            "UPDATE deals SET \
                title = $2, amount = $3, stage = $4, priority = $5, executive = $6, \
                manager = $7, associated_company = $8, associated_contacts = $9, \
                contact_id = COALESCE($10, contact_id), close_date = $11, status = $12, \
                probability = $13, description = $14, notes = $15 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.amount)
            .bind(&input.stage)
            .bind(&input.priority)
            .bind(&input.executive)
            .bind(&input.manager)
            .bind(&input.associated_company)
            .bind(&input.associated_contacts)
            .bind(contact_id)
            .bind(input.close_date)
            .bind(&input.status)
            .bind(input.probability)
            .bind(&input.description)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every deal whose id is in `ids` in one statement.
    ///
    /// Returns the number of rows actually removed; ids that matched nothing
    /// are not an error.
    pub async fn bulk_delete(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deals WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Partial updates
    // -----------------------------------------------------------------------

    /// Move a deal to another stage. A missing probability leaves the stored
    /// value in place; the statement never reads it back first.
    pub async fn move_stage(
        pool: &PgPool,
        id: DbId,
        input: &StageMove,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!(
            "UPDATE deals SET \
                stage = $2, \
                probability = COALESCE($3, probability) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .bind(&input.stage)
            .bind(input.probability)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_stage(
        pool: &PgPool,
        id: DbId,
        stage: &str,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!("UPDATE deals SET stage = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .bind(stage)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_priority(
        pool: &PgPool,
        id: DbId,
        priority: &str,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!("UPDATE deals SET priority = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .bind(priority)
            .fetch_optional(pool)
            .await
    }

    /// Update executive and/or manager. Only `Some` fields are applied; the
    /// row's `updated_at` is refreshed even when neither is supplied.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        input: &DealAssignment,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!(
            "UPDATE deals SET \
                executive = COALESCE($2, executive), \
                manager = COALESCE($3, manager) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .bind(&input.executive)
            .bind(&input.manager)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Deals matching every set criterion, newest first.
    pub async fn filter(pool: &PgPool, filter: &DealFilter) -> Result<Vec<Deal>, sqlx::Error> {
        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.stage.is_some() {
            conditions.push(format!("stage = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.priority.is_some() {
            conditions.push(format!("priority = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.executive.is_some() {
            conditions.push(format!("executive ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.manager.is_some() {
            conditions.push(format!("manager ILIKE ${bind_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM deals {where_clause} ORDER BY created_at DESC, id DESC"
        );

        let mut q = sqlx::query_as::<_, Deal>(&query);

        // Bind dynamic parameters in order.
        if let Some(ref stage) = filter.stage {
            q = q.bind(stage);
        }
        if let Some(ref priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(ref status) = filter.status {
            q = q.bind(status);
        }
        if let Some(ref executive) = filter.executive {
            q = q.bind(contains_pattern(executive));
        }
        if let Some(ref manager) = filter.manager {
            q = q.bind(contains_pattern(manager));
        }

        q.fetch_all(pool).await
    }

    /// Group-by aggregations over the whole collection plus a global summary.
    pub async fn analytics(pool: &PgPool) -> Result<DealAnalytics, sqlx::Error> {
        let by_stage = sqlx::query_as::<_, StageBreakdown>(
            "SELECT stage, COUNT(*) AS count, \
                COALESCE(SUM(amount), 0)::float8 AS total_amount, \
                COALESCE(AVG(probability), 0)::float8 AS avg_probability \
             FROM deals GROUP BY stage ORDER BY stage",
        )
        .fetch_all(pool)
        .await?;

        let by_priority = sqlx::query_as::<_, PriorityBreakdown>(
            "SELECT priority, COUNT(*) AS count, \
                COALESCE(SUM(amount), 0)::float8 AS total_amount \
             FROM deals GROUP BY priority ORDER BY priority",
        )
        .fetch_all(pool)
        .await?;

        let by_status = sqlx::query_as::<_, StatusBreakdown>(
            "SELECT status, COUNT(*) AS count, \
                COALESCE(SUM(amount), 0)::float8 AS total_amount \
             FROM deals GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await?;

        // Aggregates without GROUP BY always yield one row, so an empty
        // collection produces zeros rather than no summary.
        let summary = sqlx::query_as::<_, DealSummary>(
            "SELECT COUNT(*) AS total_deals, \
                COALESCE(SUM(amount), 0)::float8 AS total_value, \
                COALESCE(AVG(amount), 0)::float8 AS avg_amount, \
                COALESCE(AVG(probability), 0)::float8 AS avg_probability \
             FROM deals",
        )
        .fetch_one(pool)
        .await?;

        Ok(DealAnalytics {
            pipeline: PipelineBreakdown {
                by_stage,
                by_priority,
                by_status,
            },
            summary,
        })
    }

    // -----------------------------------------------------------------------
    // Contact join
    // -----------------------------------------------------------------------

    /// Join primary and associated contacts into each deal with one batched
    /// contact lookup.
    pub async fn with_contacts(
        pool: &PgPool,
        deals: Vec<Deal>,
        projection: ContactProjection,
    ) -> Result<Vec<DealView>, sqlx::Error> {
        let mut ids: Vec<DbId> = deals
            .iter()
            .flat_map(|d| {
                std::iter::once(d.contact_id).chain(d.associated_contacts.iter().copied())
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        tracing::debug!(deals = deals.len(), contacts = ids.len(), "Joining contacts into deals");

        let contacts: HashMap<DbId, ContactRef> = ContactRepo::find_refs(pool, &ids)
            .await?
            .into_iter()
            .map(|c| {
                let c = match projection {
                    ContactProjection::Summary => c.summary(),
                    ContactProjection::Detail => c,
                };
                (c.id, c)
            })
            .collect();

        Ok(deals
            .into_iter()
            .map(|deal| {
                let contact = contacts.get(&deal.contact_id).cloned();
                let associated_contact_details = deal
                    .associated_contacts
                    .iter()
                    .filter_map(|id| contacts.get(id).cloned().map(ContactRef::summary))
                    .collect();
                DealView {
                    deal,
                    contact,
                    associated_contact_details,
                }
            })
            .collect())
    }

    /// Single-deal variant of [`DealRepo::with_contacts`].
    pub async fn with_contact(
        pool: &PgPool,
        deal: Deal,
        projection: ContactProjection,
    ) -> Result<DealView, sqlx::Error> {
        let mut views = Self::with_contacts(pool, vec![deal], projection).await?;
        views
            .pop()
            .ok_or_else(|| sqlx::Error::Protocol("contact join dropped a deal".into()))
    }
}
