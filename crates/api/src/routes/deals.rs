//! Route definitions for the `/deals` resource.
//!
//! The literal segments (`filter`, `analytics`, `bulk`) are matched ahead of
//! `/{id}` by axum's router, so they never reach the id extractor.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::deals;
use crate::state::AppState;

/// Routes mounted at `/api/deals`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /filter            -> filter
/// GET    /analytics         -> analytics
/// DELETE /bulk              -> bulk_delete
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// POST   /{id}/move         -> move_stage
/// PATCH  /{id}/stage        -> update_stage
/// PATCH  /{id}/priority     -> update_priority
/// PATCH  /{id}/assign       -> assign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(deals::list).post(deals::create))
        .route("/filter", get(deals::filter))
        .route("/analytics", get(deals::analytics))
        .route("/bulk", delete(deals::bulk_delete))
        .route(
            "/{id}",
            get(deals::get_by_id)
                .put(deals::update)
                .delete(deals::delete),
        )
        .route("/{id}/move", post(deals::move_stage))
        .route("/{id}/stage", patch(deals::update_stage))
        .route("/{id}/priority", patch(deals::update_priority))
        .route("/{id}/assign", patch(deals::assign))
}
