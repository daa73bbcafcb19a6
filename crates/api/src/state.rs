/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// The pool is created once at startup and handed to every handler here
/// instead of living in a global.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: crm_db::DbPool,
}
