//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values and need no
//! database or HTTP server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use crm_api::error::AppError;
use crm_core::error::CoreError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_returns_404_with_entity_message() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Deal",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Deal not found");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn contact_not_found_returns_404() {
    let (status, json) = error_to_response(CoreError::ContactNotFound(7).into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Contact not found");
}

#[tokio::test]
async fn invalid_id_returns_400() {
    let err = AppError::Core(CoreError::InvalidId {
        entity: "Contact",
        raw: "abc".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid contact ID");
}

#[tokio::test]
async fn validation_lists_every_message() {
    let err = AppError::Core(CoreError::Validation(vec![
        "Name is required".into(),
        "Email is required".into(),
    ]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation Error");
    assert_eq!(
        json["errors"],
        serde_json::json!(["Name is required", "Email is required"])
    );
}

#[tokio::test]
async fn duplicate_key_returns_400_with_its_message() {
    let err = AppError::Core(CoreError::DuplicateKey(
        "Contact with this email already exists".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Contact with this email already exists");
}

#[tokio::test]
async fn bad_request_returns_400() {
    let err = AppError::BadRequest("Please provide an array of deal IDs".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Please provide an array of deal IDs");
}

#[tokio::test]
async fn internal_error_returns_500_with_raw_text() {
    let err = AppError::InternalError("connection reset".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Server Error");
    assert_eq!(json["error"], "connection reset");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn other_database_errors_return_500() {
    let err = AppError::Database(sqlx::Error::PoolTimedOut);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Server Error");
    assert!(json["error"].as_str().unwrap().contains("pool timed out"));
}
