//! Task approval models.

use praxio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `task_approvals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskApproval {
    pub id: DbId,
    pub task_id: DbId,
    pub workflow_step_id: DbId,
    pub approved: bool,
    pub comment: Option<String>,
    pub approver_id: DbId,
    pub created_at: Timestamp,
}

/// Request body for recording an approval decision.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskApproval {
    pub task: DbId,
    pub workflow_step: DbId,
    #[serde(default = "default_approved")]
    pub approved: bool,
    pub comment: Option<String>,
}

fn default_approved() -> bool {
    true
}
