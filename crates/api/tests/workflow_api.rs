//! HTTP-level tests for the connection preview endpoint.
//!
//! Preview is pure computation over the request payload, so these run
//! without a live database.

mod common;

use axum::http::StatusCode;
use common::{body_json, make_token, post_json_auth};

fn steps(names: &[&str]) -> Vec<serde_json::Value> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            serde_json::json!({ "id": -(i as i64 + 1), "name": name })
        })
        .collect()
}

/// Sequential mode chains each step to its successor.
#[tokio::test]
async fn preview_sequential_chains_steps() {
    let token = make_token(2, "manager", true, false);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "steps": steps(&["Prepare", "Review", "File"]),
        "mode": "sequential",
    });
    let response = post_json_auth(
        app,
        "/api/v1/workflow-definitions/preview-connections",
        &token,
        body,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let out = &json["data"]["steps"];

    assert_eq!(out[0]["next_steps"], serde_json::json!([-2]));
    assert_eq!(out[1]["next_steps"], serde_json::json!([-3]));
    assert_eq!(out[2]["next_steps"], serde_json::json!([]));
    assert_eq!(json["data"]["errors"], serde_json::json!([]));
}

/// Conditional mode fans out from the first step.
#[tokio::test]
async fn preview_conditional_fans_out_from_first() {
    let token = make_token(2, "manager", true, false);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "steps": steps(&["Triage", "Fast path", "Slow path", "Close"]),
        "mode": "conditional",
    });
    let response = post_json_auth(
        app,
        "/api/v1/workflow-definitions/preview-connections",
        &token,
        body,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let out = &json["data"]["steps"];

    assert_eq!(out[0]["next_steps"], serde_json::json!([-2, -3, -4]));
    assert_eq!(out[1]["next_steps"], serde_json::json!([-4]));
    assert_eq!(out[2]["next_steps"], serde_json::json!([-4]));
    assert_eq!(out[3]["next_steps"], serde_json::json!([]));
}

/// Custom mode leaves edges alone and surfaces validation findings
/// (here, two disconnected steps).
#[tokio::test]
async fn preview_custom_reports_orphans() {
    let token = make_token(2, "manager", true, false);
    let app = common::build_test_app(common::lazy_pool());

    let body = serde_json::json!({
        "steps": steps(&["Prepare", "Review"]),
        "mode": "custom",
    });
    let response = post_json_auth(
        app,
        "/api/v1/workflow-definitions/preview-connections",
        &token,
        body,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let errors = json["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0]
        .as_str()
        .unwrap()
        .contains("not connected to any other step"));
}
