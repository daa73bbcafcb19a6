pub mod contacts;
pub mod deals;
pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers::system;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /contacts/...      contact CRUD, role assignment, attachments
/// /deals/...         deal CRUD, pipeline moves, filter, analytics, bulk delete
/// /debug             echo the request body (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/contacts", contacts::router())
        .nest("/deals", deals::router())
        .route("/debug", post(system::debug_echo))
}
