//! Handlers for single-step CRUD on workflow steps.
//!
//! Bulk replacement of a definition's step set goes through the definition
//! save path; these endpoints serve incremental edits. Writes guard against
//! dangling edge references; the full structural validation runs on the
//! definition save.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use praxio_core::error::CoreError;
use praxio_core::types::DbId;
use praxio_core::workflow::{derive_previous_steps, StepNode};
use praxio_db::models::workflow_step::{
    CreateWorkflowStep, UpdateWorkflowStep, WorkflowStep, WorkflowStepView,
};
use praxio_db::repositories::{WorkflowRepo, WorkflowStepRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Attach derived incoming edges to step rows for API responses.
pub fn step_views(steps: &[WorkflowStep]) -> Vec<WorkflowStepView> {
    let nodes: Vec<StepNode> = steps.iter().map(|s| s.to_node()).collect();
    let previous = derive_previous_steps(&nodes);
    steps
        .iter()
        .map(|step| WorkflowStepView {
            previous_steps: previous.get(&step.id).cloned().unwrap_or_default(),
            step: step.clone(),
        })
        .collect()
}

fn require_workflow_editor(user: &AuthUser) -> AppResult<()> {
    if !user.capabilities().can_edit_any_task() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have permission to edit workflow steps".into(),
        )));
    }
    Ok(())
}

/// Reject edge ids that do not belong to the given workflow's step set.
fn ensure_no_dangling_edges(
    step_name: &str,
    next_steps: &[DbId],
    sibling_ids: &[DbId],
) -> AppResult<()> {
    let stray: Vec<String> = next_steps
        .iter()
        .filter(|id| !sibling_ids.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !stray.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Step '{}' references unknown step ids: {}",
            step_name,
            stray.join(", ")
        ))));
    }
    Ok(())
}

/// Query parameters for the step list.
#[derive(Debug, Deserialize)]
pub struct ListStepsQuery {
    pub workflow: DbId,
}

/// GET /api/v1/workflow-steps?workflow={id}
///
/// List a definition's steps in display order, with derived
/// `previous_steps`.
pub async fn list_steps(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListStepsQuery>,
) -> AppResult<impl IntoResponse> {
    WorkflowRepo::find_by_id(&state.pool, query.workflow)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id: query.workflow,
        }))?;

    let steps = WorkflowStepRepo::list_for_workflow(&state.pool, query.workflow).await?;
    Ok(Json(DataResponse {
        data: step_views(&steps),
    }))
}

/// POST /api/v1/workflow-steps
///
/// Append a step to a definition (order assigned at the end).
pub async fn create_step(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflowStep>,
) -> AppResult<impl IntoResponse> {
    require_workflow_editor(&user)?;
    input.validate()?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Step name must not be empty".into(),
        )));
    }

    WorkflowRepo::find_by_id(&state.pool, input.workflow)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id: input.workflow,
        }))?;

    let siblings = WorkflowStepRepo::list_for_workflow(&state.pool, input.workflow).await?;
    let sibling_ids: Vec<DbId> = siblings.iter().map(|s| s.id).collect();
    ensure_no_dangling_edges(&input.name, &input.next_steps, &sibling_ids)?;

    let node = StepNode {
        // Id and order are assigned by the insert.
        id: 0,
        name: input.name.clone(),
        description: input.description.clone(),
        order: 0,
        assign_to: input.assign_to,
        requires_approval: input.requires_approval,
        approver_role: input.approver_role.clone(),
        next_steps: input.next_steps.clone(),
    };
    let step = WorkflowStepRepo::create(&state.pool, input.workflow, &node).await?;

    tracing::info!(
        workflow_id = input.workflow,
        step_id = step.id,
        user_id = user.user_id,
        "Workflow step created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: step })))
}

/// PUT /api/v1/workflow-steps/{id}
///
/// Update a step's fields and outgoing edges.
pub async fn update_step(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkflowStep>,
) -> AppResult<impl IntoResponse> {
    require_workflow_editor(&user)?;
    input.validate()?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Step name must not be empty".into(),
        )));
    }

    let existing = WorkflowStepRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowStep",
            id,
        }))?;

    let siblings = WorkflowStepRepo::list_for_workflow(&state.pool, existing.workflow_id).await?;
    let sibling_ids: Vec<DbId> = siblings.iter().map(|s| s.id).collect();
    ensure_no_dangling_edges(&input.name, &input.next_steps, &sibling_ids)?;

    let node = StepNode {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        order: existing.step_order,
        assign_to: input.assign_to,
        requires_approval: input.requires_approval,
        // Kept even when requires_approval is toggled off; the label is
        // only hidden, not discarded.
        approver_role: input.approver_role.clone(),
        next_steps: input.next_steps.clone(),
    };
    let step = WorkflowStepRepo::update(&state.pool, id, &node)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowStep",
            id,
        }))?;

    tracing::info!(step_id = id, user_id = user.user_id, "Workflow step updated");

    Ok(Json(DataResponse { data: step }))
}

/// DELETE /api/v1/workflow-steps/{id}
///
/// Delete a step; its id is scrubbed from every sibling's edge set in the
/// same transaction.
pub async fn delete_step(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_workflow_editor(&user)?;

    let deleted = WorkflowStepRepo::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "WorkflowStep",
            id,
        }));
    }

    tracing::info!(step_id = id, user_id = user.user_id, "Workflow step deleted");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": true }),
    }))
}
