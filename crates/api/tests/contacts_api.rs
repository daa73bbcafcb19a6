//! HTTP-level integration tests for the contact endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, body_text, build_test_app, contact_body, create_contact, delete, get, patch_json,
    post_json, post_raw, put_json,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn root_returns_greeting(pool: PgPool) {
    let response = get(build_test_app(pool), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Hello lupira");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database(pool: PgPool) {
    let response = get(build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dbHealthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn debug_echoes_body(pool: PgPool) {
    let response = post_json(build_test_app(pool), "/api/debug", json!({"a": [1, 2]})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Debug endpoint received data");
    assert_eq!(json["receivedData"], json!({"a": [1, 2]}));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_contact_returns_201_with_defaults(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/contacts",
        json!({
            "name": "  Jane Doe ",
            "email": "Jane@Example.COM",
            "phone": "+15550100",
            "tags": [" vip ", "", "renewal"],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Contact created successfully");

    let data = &json["data"];
    assert!(data["id"].is_number());
    assert_eq!(data["name"], "Jane Doe");
    assert_eq!(data["email"], "jane@example.com");
    assert_eq!(data["leadSource"], "Other");
    assert_eq!(data["status"], "New");
    assert_eq!(data["tags"], json!(["vip", "renewal"]));
    assert_eq!(data["attachments"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_contact_reports_every_invalid_field(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/contacts",
        json!({"email": "not-an-email", "phone": "555-0100"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Validation Error");
    assert_eq!(
        json["errors"],
        json!([
            "Name is required",
            "Please enter a valid email address",
            "Please enter a valid phone number",
        ])
    );

    let list = body_json(get(build_test_app(pool), "/api/contacts").await).await;
    assert_eq!(list["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_contact_rejects_non_ascii_email_and_phone(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/contacts",
        json!({"name": "José", "email": "josé@example.com", "phone": "1٢٣٤٥٦٧"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["errors"],
        json!([
            "Please enter a valid email address",
            "Please enter a valid phone number",
        ])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_contact_rejects_unknown_status(pool: PgPool) {
    let mut body = contact_body("Jane", "jane@example.com");
    body["status"] = json!("Archived");

    let response = post_json(build_test_app(pool), "/api/contacts", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["errors"][0].as_str().unwrap().starts_with("Invalid status 'Archived'"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_rejected_case_insensitively(pool: PgPool) {
    let first = create_contact(&pool, "First", "a@x.com").await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/contacts",
        contact_body("Second", "A@X.com"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Contact with this email already exists");

    let list = body_json(get(build_test_app(pool.clone()), "/api/contacts").await).await;
    assert_eq!(list["count"], 1);

    let existing = body_json(get(build_test_app(pool), &format!("/api/contacts/{first}")).await).await;
    assert_eq!(existing["data"]["name"], "First");
    assert_eq!(existing["data"]["email"], "a@x.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_gets_the_envelope(pool: PgPool) {
    let response = post_raw(build_test_app(pool), "/api/contacts", "{\"name\": ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_is_newest_first(pool: PgPool) {
    let first = create_contact(&pool, "First", "first@x.com").await;
    let second = create_contact(&pool, "Second", "second@x.com").await;

    let json = body_json(get(build_test_app(pool), "/api/contacts").await).await;

    assert_eq!(json["count"], 2);
    assert_eq!(json["data"][0]["id"], second);
    assert_eq!(json["data"][1]["id"], first);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_contact_by_id(pool: PgPool) {
    let id = create_contact(&pool, "Jane", "jane@example.com").await;

    let response = get(build_test_app(pool), &format!("/api/contacts/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Jane");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_missing_contact_returns_404(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/contacts/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Contact not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_contact_id_returns_400(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/contacts/not-an-id").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid contact ID");
}

// ---------------------------------------------------------------------------
// Update / assign / attachments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_replaces_the_contact(pool: PgPool) {
    let id = create_contact(&pool, "Jane", "jane@example.com").await;

    let response = put_json(
        build_test_app(pool),
        &format!("/api/contacts/{id}"),
        json!({
            "name": "Jane Smith",
            "email": "jane@example.com",
            "phone": "+15550199",
            "status": "Qualified",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Contact updated successfully");
    assert_eq!(json["data"]["name"], "Jane Smith");
    assert_eq!(json["data"]["status"], "Qualified");
    // Omitted optional fields are cleared by a full replace.
    assert!(json["data"]["company"].is_null());
    assert!(json["data"]["lastActivity"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_to_another_contacts_email_is_rejected(pool: PgPool) {
    create_contact(&pool, "First", "first@x.com").await;
    let second = create_contact(&pool, "Second", "second@x.com").await;

    let response = put_json(
        build_test_app(pool),
        &format!("/api/contacts/{second}"),
        contact_body("Second", "first@x.com"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Contact with this email already exists"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assign_only_touches_supplied_roles(pool: PgPool) {
    let id = create_contact(&pool, "Jane", "jane@example.com").await;
    let uri = format!("/api/contacts/{id}/assign");

    patch_json(
        build_test_app(pool.clone()),
        &uri,
        json!({"assignEmployee": "Emp", "assignManager": "Mgr"}),
    )
    .await;
    let response = patch_json(
        build_test_app(pool),
        &uri,
        json!({"assignManager": "New Mgr"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Contact assignment updated successfully");
    assert_eq!(json["data"]["assignEmployee"], "Emp");
    assert_eq!(json["data"]["assignManager"], "New Mgr");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assign_missing_contact_returns_404(pool: PgPool) {
    let response = patch_json(
        build_test_app(pool),
        "/api/contacts/999999/assign",
        json!({"assignEmployee": "Emp"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_attachment_appends_metadata(pool: PgPool) {
    let id = create_contact(&pool, "Jane", "jane@example.com").await;

    let response = post_json(
        build_test_app(pool),
        &format!("/api/contacts/{id}/attachments"),
        json!({"fileName": "cv.pdf", "filePath": "/files/cv.pdf", "fileSize": 2048}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let attachments = json["data"]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["fileName"], "cv.pdf");
    assert_eq!(attachments[0]["fileSize"], 2048);
    assert!(attachments[0]["uploadedAt"].is_string());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_contact_then_404(pool: PgPool) {
    let id = create_contact(&pool, "Jane", "jane@example.com").await;
    let uri = format!("/api/contacts/{id}");

    let response = delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Contact deleted successfully"
    );

    let response = get(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
