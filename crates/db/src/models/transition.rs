//! Workflow transition history models.

use praxio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `workflow_transitions` table: one advancement of a task's
/// current-step pointer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowTransition {
    pub id: DbId,
    pub task_id: DbId,
    pub from_step_id: Option<DbId>,
    pub to_step_id: Option<DbId>,
    pub changed_by: DbId,
    pub comment: Option<String>,
    pub time_spent_minutes: Option<i32>,
    pub created_at: Timestamp,
}

/// Request body for advancing a task's workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceWorkflowRequest {
    /// The step to move to; `null` completes the workflow.
    pub next_step_id: Option<DbId>,
    pub comment: Option<String>,
    /// Minutes spent on the step being left, recorded on the transition.
    pub time_spent_minutes: Option<i32>,
}
