//! Handlers for task approval records.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use praxio_core::error::CoreError;
use praxio_core::types::DbId;
use praxio_core::workflow::check_approve;
use praxio_db::models::approval::CreateTaskApproval;
use praxio_db::repositories::{ApprovalRepo, TaskRepo, WorkflowStepRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the approval list.
#[derive(Debug, Deserialize)]
pub struct ListApprovalsQuery {
    pub task: DbId,
}

/// GET /api/v1/task-approvals?task={id}
///
/// List a task's approval records, oldest first.
pub async fn list_approvals(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListApprovalsQuery>,
) -> AppResult<impl IntoResponse> {
    TaskRepo::find_by_id(&state.pool, query.task)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: query.task,
        }))?;

    let approvals = ApprovalRepo::list_for_task(&state.pool, query.task).await?;
    Ok(Json(DataResponse { data: approvals }))
}

/// POST /api/v1/task-approvals
///
/// Record an approval decision for one step of one task. The step must
/// belong to the task's attached workflow and must be marked as requiring
/// approval; the caller must hold approval rights.
pub async fn create_approval(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateTaskApproval>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_by_id(&state.pool, input.task)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: input.task,
        }))?;

    let step = WorkflowStepRepo::find_by_id(&state.pool, input.workflow_step)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkflowStep",
            id: input.workflow_step,
        }))?;

    if task.workflow_id != Some(step.workflow_id) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Step {} does not belong to this task's workflow",
            step.id
        ))));
    }

    check_approve(&step.to_node(), &user.capabilities())?;

    let approval = ApprovalRepo::create(&state.pool, &input, user.user_id).await?;

    tracing::info!(
        task_id = input.task,
        step_id = input.workflow_step,
        approved = approval.approved,
        user_id = user.user_id,
        "Approval recorded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: approval })))
}
