//! Handlers for a task's workflow instance: attach, snapshot, advance.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use praxio_core::error::CoreError;
use praxio_core::types::DbId;
use praxio_core::workflow::{check_advance, workflow_progress, ApprovalRecord, WorkflowProgress};
use praxio_db::models::approval::TaskApproval;
use praxio_db::models::task::Task;
use praxio_db::models::transition::{AdvanceWorkflowRequest, WorkflowTransition};
use praxio_db::models::workflow_step::{to_nodes, WorkflowStepView};
use praxio_db::repositories::{
    ApprovalRepo, TaskRepo, TimeEntryRepo, TransitionRepo, WorkflowRepo, WorkflowStepRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

use super::workflow_steps::step_views;

// ---------------------------------------------------------------------------
// Attach
// ---------------------------------------------------------------------------

/// Request body for attaching a workflow definition to a task.
#[derive(Debug, Deserialize)]
pub struct AssignWorkflowRequest {
    pub workflow_id: DbId,
}

/// POST /api/v1/tasks/{id}/assign-workflow
///
/// Attach a definition to a task; the order-1 step becomes current.
pub async fn assign_workflow(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<AssignWorkflowRequest>,
) -> AppResult<impl IntoResponse> {
    let task = find_task(&state, task_id).await?;
    ensure_task_editor(&user, &task)?;

    WorkflowRepo::find_by_id(&state.pool, input.workflow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id: input.workflow_id,
        }))?;

    let steps = WorkflowStepRepo::list_for_workflow(&state.pool, input.workflow_id).await?;
    if steps.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot attach a workflow with no steps".into(),
        )));
    }
    let first_step_id = steps.iter().min_by_key(|s| s.step_order).map(|s| s.id);

    let task = TaskRepo::assign_workflow(&state.pool, task_id, input.workflow_id, first_step_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    tracing::info!(
        task_id,
        workflow_id = input.workflow_id,
        user_id = user.user_id,
        "Workflow attached to task",
    );

    Ok(Json(DataResponse { data: task }))
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The instance snapshot for one task's attached workflow.
#[derive(Debug, Serialize)]
pub struct WorkflowStatus {
    pub id: DbId,
    pub name: String,
    pub current_step: Option<WorkflowStepView>,
    pub steps: Vec<WorkflowStepView>,
    /// Cumulative minutes logged per step id.
    pub time_by_step: BTreeMap<DbId, i64>,
    pub approvals: Vec<TaskApproval>,
    pub history: Vec<WorkflowTransition>,
    pub progress: WorkflowProgress,
}

/// Response envelope payload: `workflow` is `null` when the task has no
/// workflow attached.
#[derive(Debug, Serialize)]
pub struct WorkflowStatusResponse {
    pub workflow: Option<WorkflowStatus>,
}

/// GET /api/v1/tasks/{id}/workflow-status
///
/// Assemble the read-only instance snapshot: definition, steps with derived
/// incoming edges, current step, per-step time, approvals, history, and
/// derived progress.
pub async fn workflow_status(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = find_task(&state, task_id).await?;

    let Some(workflow_id) = task.workflow_id else {
        return Ok(Json(DataResponse {
            data: WorkflowStatusResponse { workflow: None },
        }));
    };

    let definition = WorkflowRepo::find_by_id(&state.pool, workflow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowDefinition",
            id: workflow_id,
        }))?;
    let steps = WorkflowStepRepo::list_for_workflow(&state.pool, workflow_id).await?;
    let views = step_views(&steps);

    let current_step = task
        .current_step_id
        .and_then(|id| views.iter().find(|v| v.step.id == id).cloned());
    let current_order = current_step.as_ref().map(|v| v.step.step_order);

    let time_by_step: BTreeMap<DbId, i64> = TimeEntryRepo::sums_for_task(&state.pool, task_id)
        .await?
        .into_iter()
        .map(|sum| (sum.workflow_step_id, sum.minutes))
        .collect();
    let approvals = ApprovalRepo::list_for_task(&state.pool, task_id).await?;
    let history = TransitionRepo::list_for_task(&state.pool, task_id).await?;

    let progress = workflow_progress(&to_nodes(&steps), current_order, task.workflow_completed);

    Ok(Json(DataResponse {
        data: WorkflowStatusResponse {
            workflow: Some(WorkflowStatus {
                id: definition.id,
                name: definition.name,
                current_step,
                steps: views,
                time_by_step,
                approvals,
                history,
                progress,
            }),
        },
    }))
}

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/advance-workflow
///
/// Move the task's current-step pointer along an edge (or complete the
/// workflow with `next_step_id = null`). Gating -- permission, approval on
/// the current step, edge membership -- is checked before anything is
/// written; the history append and pointer update then land in one
/// transaction.
pub async fn advance_workflow(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<AdvanceWorkflowRequest>,
) -> AppResult<impl IntoResponse> {
    let task = find_task(&state, task_id).await?;

    let Some(workflow_id) = task.workflow_id else {
        return Err(AppError::Core(CoreError::Validation(
            "Task has no workflow attached".into(),
        )));
    };
    if task.workflow_completed {
        return Err(AppError::Core(CoreError::Validation(
            "Workflow is already completed".into(),
        )));
    }

    let steps = WorkflowStepRepo::list_for_workflow(&state.pool, workflow_id).await?;
    let nodes = to_nodes(&steps);

    let current = task
        .current_step_id
        .and_then(|id| nodes.iter().find(|n| n.id == id));
    let target = match input.next_step_id {
        Some(id) => Some(nodes.iter().find(|n| n.id == id).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Step {id} is not part of this task's workflow"
            )))
        })?),
        None => None,
    };

    let approvals: Vec<ApprovalRecord> = ApprovalRepo::list_for_task(&state.pool, task_id)
        .await?
        .into_iter()
        .map(|a| ApprovalRecord {
            workflow_step: a.workflow_step_id,
            approved: a.approved,
        })
        .collect();

    check_advance(current, target, &approvals, &user.capabilities())?;

    let transition = TaskRepo::apply_advance(
        &state.pool,
        task_id,
        task.current_step_id,
        input.next_step_id,
        user.user_id,
        input.comment.as_deref(),
        input.time_spent_minutes,
    )
    .await?;

    tracing::info!(
        task_id,
        from_step = ?transition.from_step_id,
        to_step = ?transition.to_step_id,
        user_id = user.user_id,
        "Workflow advanced",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: transition })))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

async fn find_task(state: &AppState, task_id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))
}

fn ensure_task_editor(user: &AuthUser, task: &Task) -> AppResult<()> {
    let caps = user.capabilities();
    if caps.can_edit_any_task() || task.assigned_to == Some(caps.user_id) {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "You do not have permission to modify this task".into(),
    )))
}
