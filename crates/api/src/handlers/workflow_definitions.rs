//! Handlers for workflow definitions: authoring, connection preview,
//! persistence, and bottleneck analysis.
//!
//! Save paths validate everything locally (payload fields, then graph
//! structure) before any row is touched; a request that fails validation
//! never reaches the database.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use praxio_core::error::CoreError;
use praxio_core::types::DbId;
use praxio_core::workflow::{
    analyze_bottlenecks, generate_connections, validate_graph, ConnectionMode, StepNode,
    StepSample,
};
use praxio_db::models::workflow::{
    CreateWorkflowDefinition, UpdateWorkflowDefinition, WorkflowDefinition,
};
use praxio_db::models::workflow_step::{StepInput, WorkflowStepView};
use praxio_db::repositories::{TimeEntryRepo, WorkflowRepo, WorkflowStepRepo};
use serde::Deserialize;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

use super::workflow_steps::step_views;

/// A definition together with its full step set, as returned by save paths.
#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    #[serde(flatten)]
    pub definition: WorkflowDefinition,
    pub steps: Vec<WorkflowStepView>,
}

// ---------------------------------------------------------------------------
// Local validation
// ---------------------------------------------------------------------------

/// Accumulate every save-blocking error for a definition payload.
///
/// Field checks (non-empty workflow name, at least one step, non-empty step
/// names, unique step ids) run first, then the structural graph checks. The
/// save handlers refuse to touch the database while this list is non-empty.
pub fn validate_definition_payload(name: &str, nodes: &[StepNode]) -> Vec<String> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push("Workflow name must not be empty".to_string());
    }
    if nodes.is_empty() {
        errors.push("A workflow needs at least one step".to_string());
    }
    let mut seen: HashSet<DbId> = HashSet::new();
    for node in nodes {
        if node.name.trim().is_empty() {
            errors.push(format!("Step at position {} has an empty name", node.order));
        }
        if !seen.insert(node.id) {
            errors.push(format!(
                "Step '{}' repeats the id of an earlier step",
                node.name
            ));
        }
    }
    errors.extend(validate_graph(nodes));
    errors
}

fn nodes_from_inputs(steps: &[StepInput]) -> Vec<StepNode> {
    steps
        .iter()
        .enumerate()
        .map(|(i, s)| s.to_node(i + 1))
        .collect()
}

fn require_workflow_editor(user: &AuthUser) -> AppResult<()> {
    if !user.capabilities().can_edit_any_task() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have permission to manage workflow definitions".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD endpoints
// ---------------------------------------------------------------------------

/// Query parameters for the definition list.
#[derive(Debug, Deserialize)]
pub struct ListWorkflowsQuery {
    pub is_active: Option<bool>,
}

/// GET /api/v1/workflow-definitions
///
/// List definition summaries, optionally filtered to active ones.
pub async fn list_definitions(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListWorkflowsQuery>,
) -> AppResult<impl IntoResponse> {
    let definitions = WorkflowRepo::list(&state.pool, query.is_active).await?;
    Ok(Json(DataResponse { data: definitions }))
}

/// GET /api/v1/workflow-definitions/{id}
///
/// Retrieve one definition (steps are fetched separately).
pub async fn get_definition(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let definition = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id,
        }))?;
    Ok(Json(DataResponse { data: definition }))
}

/// POST /api/v1/workflow-definitions
///
/// Create a definition with its full step set. The payload is validated
/// (fields, then graph structure) before anything is written; the definition
/// row and the step reconciliation commit in one transaction, so a failure
/// mid-save leaves no orphan definition behind.
pub async fn create_definition(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflowDefinition>,
) -> AppResult<impl IntoResponse> {
    require_workflow_editor(&user)?;
    input.validate()?;

    let nodes = nodes_from_inputs(&input.steps);
    let errors = validate_definition_payload(&input.name, &nodes);
    if !errors.is_empty() {
        return Err(AppError::Core(CoreError::Validation(errors.join("; "))));
    }

    let (definition, steps) = WorkflowRepo::create_with_steps(
        &state.pool,
        &input.name,
        input.description.as_deref(),
        input.is_active,
        user.user_id,
        &nodes,
    )
    .await?;

    tracing::info!(
        workflow_id = definition.id,
        user_id = user.user_id,
        step_count = steps.len(),
        "Workflow definition created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: WorkflowDetail {
                definition,
                steps: step_views(&steps),
            },
        }),
    ))
}

/// PUT /api/v1/workflow-definitions/{id}
///
/// Update a definition's fields and replace its step set. The diff runs
/// against the persisted step set fetched fresh inside the reconciliation
/// transaction, never against what the client believes is saved.
pub async fn update_definition(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkflowDefinition>,
) -> AppResult<impl IntoResponse> {
    require_workflow_editor(&user)?;
    input.validate()?;

    let nodes = nodes_from_inputs(&input.steps);
    let errors = validate_definition_payload(&input.name, &nodes);
    if !errors.is_empty() {
        return Err(AppError::Core(CoreError::Validation(errors.join("; "))));
    }

    let (definition, steps) = WorkflowRepo::update_with_steps(
        &state.pool,
        id,
        &input.name,
        input.description.as_deref(),
        input.is_active,
        &nodes,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "WorkflowDefinition",
        id,
    }))?;

    tracing::info!(
        workflow_id = id,
        user_id = user.user_id,
        step_count = steps.len(),
        "Workflow definition updated",
    );

    Ok(Json(DataResponse {
        data: WorkflowDetail {
            definition,
            steps: step_views(&steps),
        },
    }))
}

/// DELETE /api/v1/workflow-definitions/{id}
///
/// Delete a definition; its steps cascade. Admin only.
pub async fn delete_definition(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = WorkflowRepo::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id,
        }));
    }

    tracing::info!(workflow_id = id, user_id = user.user_id, "Workflow definition deleted");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": true }),
    }))
}

// ---------------------------------------------------------------------------
// Connection preview endpoint
// ---------------------------------------------------------------------------

/// Request body for connection preview.
#[derive(Debug, Deserialize)]
pub struct PreviewConnectionsRequest {
    pub steps: Vec<StepInput>,
    pub mode: ConnectionMode,
}

/// Preview payload: regenerated steps plus any structural errors.
#[derive(Debug, Serialize)]
pub struct PreviewConnectionsResponse {
    pub steps: Vec<StepNode>,
    pub errors: Vec<String>,
}

/// POST /api/v1/workflow-definitions/preview-connections
///
/// Regenerate a step list's edges for the given topology mode, without
/// persisting anything. Returns the connected list and the validator's
/// findings so the author can fix problems before saving.
pub async fn preview_connections(
    RequireAuth(_user): RequireAuth,
    Json(input): Json<PreviewConnectionsRequest>,
) -> AppResult<impl IntoResponse> {
    let nodes = nodes_from_inputs(&input.steps);
    let connected = generate_connections(&nodes, input.mode);
    let errors = validate_graph(&connected);
    Ok(Json(DataResponse {
        data: PreviewConnectionsResponse {
            steps: connected,
            errors,
        },
    }))
}

// ---------------------------------------------------------------------------
// Analysis endpoint
// ---------------------------------------------------------------------------

/// GET /api/v1/workflow-definitions/{id}/analyze
///
/// Bottleneck analysis over logged time across every task using this
/// definition. Advisory; read-only.
pub async fn analyze_definition(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id,
        }))?;

    let steps = WorkflowStepRepo::list_for_workflow(&state.pool, id).await?;
    let nodes: Vec<StepNode> = steps.iter().map(|s| s.to_node()).collect();
    let samples: Vec<StepSample> = TimeEntryRepo::samples_for_workflow(&state.pool, id)
        .await?
        .into_iter()
        .map(|row| StepSample {
            step_id: row.workflow_step_id,
            minutes: row.minutes as i64,
        })
        .collect();

    let report = analyze_bottlenecks(&nodes, &samples);
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use praxio_core::workflow::{generate_connections, ConnectionMode};

    use super::*;

    fn nodes(names: &[&str]) -> Vec<StepNode> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| StepNode::new(i as DbId + 1, *name, i as i32 + 1).unwrap())
            .collect()
    }

    // -- Save gating --------------------------------------------------------

    #[test]
    fn empty_name_blocks_save() {
        let connected = generate_connections(&nodes(&["A", "B"]), ConnectionMode::Sequential);
        let errors = validate_definition_payload("", &connected);
        assert!(errors.iter().any(|e| e.contains("Workflow name")));
    }

    #[test]
    fn empty_step_list_blocks_save() {
        let errors = validate_definition_payload("Month-end close", &[]);
        assert!(errors.iter().any(|e| e.contains("at least one step")));
    }

    #[test]
    fn duplicate_step_ids_block_save() {
        // Two payload steps resolving to one id would collapse into a
        // single row during reconciliation.
        let mut list = nodes(&["A", "B"]);
        list[1].id = list[0].id;
        let errors = validate_definition_payload("Month-end close", &list);
        assert!(errors.iter().any(|e| e.contains("repeats the id")));
    }

    #[test]
    fn structural_errors_block_save() {
        // A -> B -> A cycle.
        let mut list = nodes(&["A", "B"]);
        list[0].next_steps = vec![2];
        list[1].next_steps = vec![1];
        let errors = validate_definition_payload("Month-end close", &list);
        assert!(errors.iter().any(|e| e.contains("Circular reference")));
    }

    #[test]
    fn valid_payload_passes() {
        let connected =
            generate_connections(&nodes(&["Prepare", "Review"]), ConnectionMode::Sequential);
        assert!(validate_definition_payload("Month-end close", &connected).is_empty());
    }

    #[test]
    fn field_and_graph_errors_accumulate() {
        let mut list = nodes(&["A", "B"]);
        list[0].next_steps = vec![99];
        list[1].next_steps = vec![1];
        let errors = validate_definition_payload("", &list);
        // Name error plus at least one structural error, all in one pass.
        assert!(errors.len() >= 2);
        assert!(errors.iter().any(|e| e.contains("Workflow name")));
        assert!(errors.iter().any(|e| e.contains("unknown step ids")));
    }
}
