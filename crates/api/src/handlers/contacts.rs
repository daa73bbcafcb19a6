//! Handlers for the `/api/contacts` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crm_core::contact::{
    AttachmentInput, ContactInput, RoleAssignmentInput, DUPLICATE_EMAIL_MESSAGE,
};
use crm_core::error::CoreError;
use crm_core::ids::CONTACT_ENTITY;
use crm_core::types::DbId;
use crm_db::models::contact::Contact;
use crm_db::repositories::ContactRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, ContactId};
use crate::response::ApiResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: CONTACT_ENTITY,
        id,
    })
}

/// POST /api/contacts
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<ContactInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Contact>>)> {
    let input = input.validate()?;

    if ContactRepo::email_taken(&state.pool, &input.email, None).await? {
        return Err(CoreError::DuplicateKey(DUPLICATE_EMAIL_MESSAGE.into()).into());
    }

    let contact = ContactRepo::create(&state.pool, &input).await?;

    tracing::info!(contact_id = contact.id, "Contact created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(contact).with_message("Contact created successfully")),
    ))
}

/// GET /api/contacts
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Contact>>>> {
    let contacts = ContactRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::list(contacts)))
}

/// GET /api/contacts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ContactId(id): ContactId,
) -> AppResult<Json<ApiResponse<Contact>>> {
    let contact = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::data(contact)))
}

/// PUT /api/contacts/{id}
///
/// Full replace: omitted optional fields are cleared and omitted
/// enumerations fall back to their defaults.
pub async fn update(
    State(state): State<AppState>,
    ContactId(id): ContactId,
    AppJson(input): AppJson<ContactInput>,
) -> AppResult<Json<ApiResponse<Contact>>> {
    let input = input.validate()?;

    if ContactRepo::email_taken(&state.pool, &input.email, Some(id)).await? {
        return Err(CoreError::DuplicateKey(DUPLICATE_EMAIL_MESSAGE.into()).into());
    }

    let contact = ContactRepo::replace(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(contact_id = id, "Contact updated");

    Ok(Json(
        ApiResponse::data(contact).with_message("Contact updated successfully"),
    ))
}

/// DELETE /api/contacts/{id}
///
/// Deals that reference the contact are left as they are.
pub async fn delete(
    State(state): State<AppState>,
    ContactId(id): ContactId,
) -> AppResult<Json<ApiResponse<()>>> {
    if !ContactRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(contact_id = id, "Contact deleted");

    Ok(Json(ApiResponse::message("Contact deleted successfully")))
}

/// PATCH /api/contacts/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    ContactId(id): ContactId,
    AppJson(input): AppJson<RoleAssignmentInput>,
) -> AppResult<Json<ApiResponse<Contact>>> {
    let input = input.validate()?;

    let contact = ContactRepo::assign_roles(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        contact_id = id,
        assign_employee = ?contact.assign_employee,
        assign_manager = ?contact.assign_manager,
        "Contact assignment updated",
    );

    Ok(Json(
        ApiResponse::data(contact).with_message("Contact assignment updated successfully"),
    ))
}

/// POST /api/contacts/{id}/attachments
///
/// Records attachment metadata. The file itself is stored elsewhere.
pub async fn add_attachment(
    State(state): State<AppState>,
    ContactId(id): ContactId,
    AppJson(input): AppJson<AttachmentInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Contact>>)> {
    let input = input.validate()?;

    let contact = ContactRepo::add_attachment(&state.pool, id, input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        contact_id = id,
        attachments = contact.attachments.0.len(),
        "Attachment recorded",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(contact).with_message("Attachment added successfully")),
    ))
}
