//! Repository for the `contacts` table.

use crm_core::contact::{NewAttachment, NewContact, RoleAssignment};
use crm_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::contact::{Attachment, Contact, ContactRef};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, email, phone, company, role, assign_employee, assign_manager, \
    lead_source, status, last_activity, notes, tags, attachments, \
    created_at, updated_at";

/// Provides CRUD operations for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a new contact, returning the created row.
    ///
    /// A second contact with the same email violates `uq_contacts_email`.
    pub async fn create(pool: &PgPool, input: &NewContact) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts \
                (name, email, phone, company, role, assign_employee, assign_manager, \
                 lead_source, status, notes, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.role)
            .bind(&input.assign_employee)
            .bind(&input.assign_manager)
            .bind(&input.lead_source)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// List all contacts, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Contact>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a contact with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM contacts WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether `email` already belongs to a contact other than `exclude_id`.
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(\
                SELECT 1 FROM contacts \
                WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Replace every mutable field and mark the contact as recently active.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        input: &NewContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET \
                name = $2, email = $3, phone = $4, company = $5, role = $6, \
                assign_employee = $7, assign_manager = $8, lead_source = $9, \
                status = $10, notes = $11, tags = $12, last_activity = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.role)
            .bind(&input.assign_employee)
            .bind(&input.assign_manager)
            .bind(&input.lead_source)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Update only the supplied assignment fields.
    pub async fn assign_roles(
        pool: &PgPool,
        id: DbId,
        input: &RoleAssignment,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET \
                assign_employee = CASE WHEN $2 THEN $3 ELSE assign_employee END, \
                assign_manager = CASE WHEN $4 THEN $5 ELSE assign_manager END, \
                last_activity = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(input.assign_employee.is_some())
            .bind(input.assign_employee.clone().flatten())
            .bind(input.assign_manager.is_some())
            .bind(input.assign_manager.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Append attachment metadata.
    pub async fn add_attachment(
        pool: &PgPool,
        id: DbId,
        input: NewAttachment,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let attachment = Attachment::new(input, chrono::Utc::now());
        let query = format!(
            "UPDATE contacts SET \
                attachments = attachments || $2, \
                last_activity = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(Json(vec![attachment]))
            .fetch_optional(pool)
            .await
    }

    /// Delete a contact. Deals referencing it are left untouched.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch the join projection for a batch of contacts. Missing ids are
    /// simply absent from the result.
    pub async fn find_refs(pool: &PgPool, ids: &[DbId]) -> Result<Vec<ContactRef>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, ContactRef>(
            "SELECT id, name, email, company, phone, role \
             FROM contacts WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
