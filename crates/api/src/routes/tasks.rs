//! Route definitions for a task's workflow instance.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Task workflow routes, mounted at `/tasks`.
///
/// ```text
/// POST   /{id}/assign-workflow    assign_workflow
/// GET    /{id}/workflow-status    workflow_status
/// POST   /{id}/advance-workflow   advance_workflow
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/assign-workflow", post(tasks::assign_workflow))
        .route("/{id}/workflow-status", get(tasks::workflow_status))
        .route("/{id}/advance-workflow", post(tasks::advance_workflow))
}
