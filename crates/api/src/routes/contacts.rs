//! Route definitions for the `/contacts` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::contacts;
use crate::state::AppState;

/// Routes mounted at `/api/contacts`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete
/// PATCH  /{id}/assign         -> assign
/// POST   /{id}/attachments    -> add_attachment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::list).post(contacts::create))
        .route(
            "/{id}",
            get(contacts::get_by_id)
                .put(contacts::update)
                .delete(contacts::delete),
        )
        .route("/{id}/assign", patch(contacts::assign))
        .route("/{id}/attachments", post(contacts::add_attachment))
}
