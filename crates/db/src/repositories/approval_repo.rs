//! Repository for the `task_approvals` table.

use praxio_core::types::DbId;
use sqlx::PgPool;

use crate::models::approval::{CreateTaskApproval, TaskApproval};

/// Column list for task_approvals queries.
const APPROVAL_COLUMNS: &str =
    "id, task_id, workflow_step_id, approved, comment, approver_id, created_at";

/// Provides CRUD operations for task approvals.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Insert a new approval record, returning the created row.
    ///
    /// Repeated approvals for the same step are not deduplicated; each call
    /// appends a record.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTaskApproval,
        approver_id: DbId,
    ) -> Result<TaskApproval, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_approvals (task_id, workflow_step_id, approved, comment, approver_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {APPROVAL_COLUMNS}"
        );
        sqlx::query_as::<_, TaskApproval>(&query)
            .bind(input.task)
            .bind(input.workflow_step)
            .bind(input.approved)
            .bind(&input.comment)
            .bind(approver_id)
            .fetch_one(pool)
            .await
    }

    /// List all approval records for a task, oldest first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TaskApproval>, sqlx::Error> {
        let query = format!(
            "SELECT {APPROVAL_COLUMNS} FROM task_approvals
             WHERE task_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, TaskApproval>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }
}
