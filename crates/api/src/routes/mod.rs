pub mod approvals;
pub mod health;
pub mod tasks;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /workflow-definitions                        list, create
/// /workflow-definitions/preview-connections    topology preview (POST)
/// /workflow-definitions/{id}                   get, update, delete
/// /workflow-definitions/{id}/analyze           bottleneck analysis
///
/// /workflow-steps                              list (?workflow=), create
/// /workflow-steps/{id}                         update, delete
///
/// /tasks/{id}/assign-workflow                  attach a definition (POST)
/// /tasks/{id}/workflow-status                  instance snapshot (GET)
/// /tasks/{id}/advance-workflow                 advance the pointer (POST)
///
/// /task-approvals                              list (?task=), create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/workflow-definitions", workflows::definition_router())
        .nest("/workflow-steps", workflows::step_router())
        .nest("/tasks", tasks::router())
        .nest("/task-approvals", approvals::router())
}
