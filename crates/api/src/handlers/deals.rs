//! Handlers for the `/api/deals` resource.
//!
//! Every deal in a response carries its contacts joined in at read time
//! (see [`DealRepo::with_contacts`]). Writes that set `contactId` check the
//! contact exists first; the check and the write are separate statements.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crm_core::deal::{
    validate_priority, validate_stage, DealAssignmentInput, DealFilter, DealInput,
    PriorityInput, StageInput, StageMoveInput,
};
use crm_core::error::CoreError;
use crm_core::ids::{IdRef, DEAL_ENTITY};
use crm_core::types::DbId;
use crm_db::models::deal::{ContactProjection, Deal, DealAnalytics, DealView};
use crm_db::repositories::{ContactRepo, DealRepo};
use crm_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery, DealId};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shapes specific to deals
// ---------------------------------------------------------------------------

/// Filter results echo the criteria that were applied.
#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub success: bool,
    pub count: usize,
    pub filters: DealFilter,
    pub data: Vec<DealView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: DEAL_ENTITY,
        id,
    })
}

async fn ensure_contact_exists(pool: &DbPool, contact_id: DbId) -> AppResult<()> {
    if ContactRepo::exists(pool, contact_id).await? {
        Ok(())
    } else {
        Err(CoreError::ContactNotFound(contact_id).into())
    }
}

/// Join contacts into an updated deal, or 404 if the update matched nothing.
async fn summary_view(pool: &DbPool, id: DbId, deal: Option<Deal>) -> AppResult<DealView> {
    let deal = deal.ok_or_else(|| not_found(id))?;
    Ok(DealRepo::with_contact(pool, deal, ContactProjection::Summary).await?)
}

/// Pull `dealIds` out of a bulk-delete body.
///
/// Missing, non-array, or empty input is a bad request, as is any entry
/// that is not a well-formed id.
fn parse_bulk_ids(body: &serde_json::Value) -> AppResult<Vec<DbId>> {
    const MESSAGE: &str = "Please provide an array of deal IDs";

    let entries = body
        .get("dealIds")
        .and_then(|v| v.as_array())
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| AppError::BadRequest(MESSAGE.into()))?;

    entries
        .iter()
        .map(|entry| {
            serde_json::from_value::<IdRef>(entry.clone())
                .ok()
                .and_then(|id| id.resolve(DEAL_ENTITY).ok())
                .ok_or_else(|| AppError::BadRequest(format!("Invalid deal ID in dealIds: {entry}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/deals
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<DealView>>>> {
    let deals = DealRepo::list(&state.pool).await?;
    let views = DealRepo::with_contacts(&state.pool, deals, ContactProjection::Summary).await?;
    Ok(Json(ApiResponse::list(views)))
}

/// GET /api/deals/filter?stage=&priority=&status=&executive=&manager=
pub async fn filter(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<DealFilter>,
) -> AppResult<Json<FilterResponse>> {
    let filter = filter.normalized();
    let deals = DealRepo::filter(&state.pool, &filter).await?;
    let views = DealRepo::with_contacts(&state.pool, deals, ContactProjection::Summary).await?;

    tracing::debug!(unfiltered = filter.is_empty(), matched = views.len(), "Deal filter");

    Ok(Json(FilterResponse {
        success: true,
        count: views.len(),
        filters: filter,
        data: views,
    }))
}

/// GET /api/deals/analytics
pub async fn analytics(State(state): State<AppState>) -> AppResult<Json<ApiResponse<DealAnalytics>>> {
    let analytics = DealRepo::analytics(&state.pool).await?;
    Ok(Json(ApiResponse::data(analytics)))
}

/// GET /api/deals/{id}
///
/// The single-deal view inlines the contact's phone and role as well.
pub async fn get_by_id(
    State(state): State<AppState>,
    DealId(id): DealId,
) -> AppResult<Json<ApiResponse<DealView>>> {
    let deal = DealRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let view = DealRepo::with_contact(&state.pool, deal, ContactProjection::Detail).await?;
    Ok(Json(ApiResponse::data(view)))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/deals
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<DealInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<DealView>>)> {
    let (contact_id, input) = input.validate_new()?;
    ensure_contact_exists(&state.pool, contact_id).await?;

    let deal = DealRepo::create(&state.pool, &input, contact_id).await?;

    tracing::info!(deal_id = deal.id, contact_id, stage = %deal.stage, "Deal created");

    let view = DealRepo::with_contact(&state.pool, deal, ContactProjection::Summary).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(view).with_message("Deal created successfully")),
    ))
}

/// POST /api/deals/{id}/move
///
/// Sets the stage, and the probability only when one is supplied.
pub async fn move_stage(
    State(state): State<AppState>,
    DealId(id): DealId,
    AppJson(input): AppJson<StageMoveInput>,
) -> AppResult<Json<ApiResponse<DealView>>> {
    let input = input.validate()?;

    let deal = DealRepo::move_stage(&state.pool, id, &input).await?;
    let view = summary_view(&state.pool, id, deal).await?;

    tracing::info!(
        deal_id = id,
        stage = %input.stage,
        probability = view.deal.probability,
        "Deal moved",
    );

    Ok(Json(ApiResponse::data(view).with_message("Deal moved successfully")))
}

/// PUT /api/deals/{id}
///
/// Full replace. `contactId` is optional here; when present it must resolve.
pub async fn update(
    State(state): State<AppState>,
    DealId(id): DealId,
    AppJson(input): AppJson<DealInput>,
) -> AppResult<Json<ApiResponse<DealView>>> {
    let contact_id = input.contact_id()?;
    if let Some(contact_id) = contact_id {
        ensure_contact_exists(&state.pool, contact_id).await?;
    }
    let input = input.validate()?;

    let deal = DealRepo::replace(&state.pool, id, &input, contact_id).await?;
    let view = summary_view(&state.pool, id, deal).await?;

    tracing::info!(deal_id = id, "Deal updated");

    Ok(Json(ApiResponse::data(view).with_message("Deal updated successfully")))
}

/// PATCH /api/deals/{id}/stage
pub async fn update_stage(
    State(state): State<AppState>,
    DealId(id): DealId,
    AppJson(input): AppJson<StageInput>,
) -> AppResult<Json<ApiResponse<DealView>>> {
    let stage = validate_stage(input.stage)?;

    let deal = DealRepo::set_stage(&state.pool, id, &stage).await?;
    let view = summary_view(&state.pool, id, deal).await?;

    tracing::info!(deal_id = id, stage = %stage, "Deal stage updated");

    Ok(Json(
        ApiResponse::data(view).with_message("Deal stage updated successfully"),
    ))
}

/// PATCH /api/deals/{id}/priority
pub async fn update_priority(
    State(state): State<AppState>,
    DealId(id): DealId,
    AppJson(input): AppJson<PriorityInput>,
) -> AppResult<Json<ApiResponse<DealView>>> {
    let priority = validate_priority(input.priority)?;

    let deal = DealRepo::set_priority(&state.pool, id, &priority).await?;
    let view = summary_view(&state.pool, id, deal).await?;

    tracing::info!(deal_id = id, priority = %priority, "Deal priority updated");

    Ok(Json(
        ApiResponse::data(view).with_message("Deal priority updated successfully"),
    ))
}

/// PATCH /api/deals/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    DealId(id): DealId,
    AppJson(input): AppJson<DealAssignmentInput>,
) -> AppResult<Json<ApiResponse<DealView>>> {
    let input = input.validate()?;

    let deal = DealRepo::assign(&state.pool, id, &input).await?;
    let view = summary_view(&state.pool, id, deal).await?;

    tracing::info!(
        deal_id = id,
        executive = %view.deal.executive,
        manager = %view.deal.manager,
        "Deal assignment updated",
    );

    Ok(Json(
        ApiResponse::data(view).with_message("Deal assignment updated successfully"),
    ))
}

/// DELETE /api/deals/{id}
pub async fn delete(
    State(state): State<AppState>,
    DealId(id): DealId,
) -> AppResult<Json<ApiResponse<()>>> {
    if !DealRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(deal_id = id, "Deal deleted");

    Ok(Json(ApiResponse::message("Deal deleted successfully")))
}

/// DELETE /api/deals/bulk
///
/// Body: `{ "dealIds": [..] }`. Ids that match nothing are skipped, so
/// `deletedCount` may be smaller than the number of ids sent.
pub async fn bulk_delete(
    State(state): State<AppState>,
    AppJson(body): AppJson<serde_json::Value>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let ids = parse_bulk_ids(&body)?;

    let deleted = DealRepo::bulk_delete(&state.pool, &ids).await?;

    tracing::info!(requested = ids.len(), deleted, "Bulk deal delete");

    Ok(Json(BulkDeleteResponse {
        success: true,
        message: format!("{deleted} deals deleted successfully"),
        deleted_count: deleted,
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn bulk_ids_accept_numbers_and_numeric_strings() {
        let ids = parse_bulk_ids(&json!({"dealIds": [1, "2", 3]})).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn bulk_ids_missing_or_empty_is_bad_request() {
        assert_matches!(parse_bulk_ids(&json!({})), Err(AppError::BadRequest(_)));
        assert_matches!(
            parse_bulk_ids(&json!({"dealIds": []})),
            Err(AppError::BadRequest(_))
        );
        assert_matches!(
            parse_bulk_ids(&json!({"dealIds": "1,2"})),
            Err(AppError::BadRequest(_))
        );
    }

    #[test]
    fn bulk_ids_with_malformed_entry_is_bad_request() {
        assert_matches!(
            parse_bulk_ids(&json!({"dealIds": [1, "abc"]})),
            Err(AppError::BadRequest(msg)) if msg.contains("abc")
        );
        assert_matches!(
            parse_bulk_ids(&json!({"dealIds": [1, null]})),
            Err(AppError::BadRequest(_))
        );
    }
}
