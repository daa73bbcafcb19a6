//! Service-level endpoints outside the resource trees.

use axum::Json;
use serde::Serialize;

use crate::extract::AppJson;

/// GET /
pub async fn root() -> &'static str {
    "Hello lupira"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugEcho {
    pub success: bool,
    pub message: &'static str,
    pub received_data: serde_json::Value,
}

/// POST /api/debug
///
/// Echoes whatever JSON body it is sent. Useful for checking what a client
/// actually puts on the wire.
pub async fn debug_echo(AppJson(body): AppJson<serde_json::Value>) -> Json<DebugEcho> {
    tracing::debug!(body = %body, "Debug endpoint hit");

    Json(DebugEcho {
        success: true,
        message: "Debug endpoint received data",
        received_data: body,
    })
}
