//! Route definitions for workflow definitions and their steps.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{workflow_definitions, workflow_steps};
use crate::state::AppState;

/// Workflow definition routes, mounted at `/workflow-definitions`.
///
/// ```text
/// GET    /                        list_definitions
/// POST   /                        create_definition
/// POST   /preview-connections     preview_connections
/// GET    /{id}                    get_definition
/// PUT    /{id}                    update_definition
/// DELETE /{id}                    delete_definition (admin only)
/// GET    /{id}/analyze            analyze_definition
/// ```
pub fn definition_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workflow_definitions::list_definitions)
                .post(workflow_definitions::create_definition),
        )
        .route(
            "/preview-connections",
            post(workflow_definitions::preview_connections),
        )
        .route(
            "/{id}",
            get(workflow_definitions::get_definition)
                .put(workflow_definitions::update_definition)
                .delete(workflow_definitions::delete_definition),
        )
        .route("/{id}/analyze", get(workflow_definitions::analyze_definition))
}

/// Workflow step routes, mounted at `/workflow-steps`.
///
/// ```text
/// GET    /?workflow={id}          list_steps
/// POST   /                        create_step
/// PUT    /{id}                    update_step
/// DELETE /{id}                    delete_step
/// ```
pub fn step_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workflow_steps::list_steps).post(workflow_steps::create_step),
        )
        .route(
            "/{id}",
            put(workflow_steps::update_step).delete(workflow_steps::delete_step),
        )
}
