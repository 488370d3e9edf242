//! HTTP-level tests for authentication, RBAC, and request validation.
//!
//! The suite runs against the lazy pool from `common` with no live
//! database: most requests are rejected before their first query, and the
//! one that reaches the save path fails fast on connection acquire.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, make_token, post_json_auth};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Requests without a bearer token are rejected with 401.
#[tokio::test]
async fn missing_token_returns_401() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/api/v1/workflow-definitions").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

/// Requests with a malformed token are rejected with 401.
#[tokio::test]
async fn garbage_token_returns_401() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get_auth(app, "/api/v1/workflow-definitions", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Tokens signed with a different secret are rejected with 401.
#[tokio::test]
async fn wrong_secret_token_returns_401() {
    use praxio_api::auth::jwt::{generate_access_token, JwtConfig};

    let other = JwtConfig {
        secret: "some-other-secret".to_string(),
        access_token_expiry_mins: 15,
    };
    let token = generate_access_token(1, "admin", true, true, &other).unwrap();

    let app = common::build_test_app(common::lazy_pool());
    let response = get_auth(app, "/api/v1/workflow-definitions", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

/// Deleting a workflow definition is admin-only; staff get 403.
#[tokio::test]
async fn staff_cannot_delete_definitions() {
    let token = make_token(3, "staff", false, false);
    let app = common::build_test_app(common::lazy_pool());
    let response = delete_auth(app, "/api/v1/workflow-definitions/1", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

/// Staff without the edit-all grant cannot create definitions.
#[tokio::test]
async fn staff_cannot_create_definitions() {
    let token = make_token(3, "staff", false, false);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "name": "Month-end close",
        "steps": [{ "name": "Prepare" }],
    });
    let response = post_json_auth(app, "/api/v1/workflow-definitions", &token, body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Payload validation
// ---------------------------------------------------------------------------

/// An empty workflow name blocks the save with 400 before anything is
/// written.
#[tokio::test]
async fn empty_name_blocks_create() {
    let token = make_token(2, "manager", true, true);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "name": "",
        "steps": [{ "name": "Prepare" }],
    });
    let response = post_json_auth(app, "/api/v1/workflow-definitions", &token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("Workflow name"));
}

/// An empty step name inside the payload blocks the save with 400.
#[tokio::test]
async fn empty_step_name_blocks_create() {
    let token = make_token(2, "manager", true, true);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "name": "Month-end close",
        "steps": [{ "name": "Prepare" }, { "name": "" }],
    });
    let response = post_json_auth(app, "/api/v1/workflow-definitions", &token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("Step name"));
}

/// Two steps resolving to one id block the save with 400 before the
/// reconciliation diff can collapse them.
#[tokio::test]
async fn duplicate_step_ids_block_create() {
    let token = make_token(2, "manager", true, true);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "name": "Month-end close",
        "steps": [
            { "id": -1, "name": "Prepare" },
            { "id": -1, "name": "Review" },
        ],
    });
    let response = post_json_auth(app, "/api/v1/workflow-definitions", &token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("repeats the id"));
}

/// A cyclic step graph blocks the save with 400.
#[tokio::test]
async fn cyclic_graph_blocks_create() {
    let token = make_token(2, "manager", true, true);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "name": "Month-end close",
        "steps": [
            { "id": -1, "name": "Prepare", "next_steps": [-2] },
            { "id": -2, "name": "Review", "next_steps": [-1] },
        ],
    });
    let response = post_json_auth(app, "/api/v1/workflow-definitions", &token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Circular reference"));
}

// ---------------------------------------------------------------------------
// Save path
// ---------------------------------------------------------------------------

/// A valid save goes straight to the single save transaction: with the
/// database unreachable the whole request fails as one unit with a
/// sanitized 500, not a partial write.
#[tokio::test]
async fn valid_create_without_database_fails_whole() {
    let token = make_token(2, "manager", true, true);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "name": "Month-end close",
        "steps": [
            { "id": -1, "name": "Prepare", "next_steps": [-2] },
            { "id": -2, "name": "Review" },
        ],
    });
    let response = post_json_auth(app, "/api/v1/workflow-definitions", &token, body).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
}
