//! Repository for the workflow-relevant slice of the `tasks` table.

use praxio_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::Task;
use crate::models::transition::WorkflowTransition;

/// Column list for tasks queries.
const TASK_COLUMNS: &str = "id, title, client_id, assigned_to, workflow_id, \
    current_step_id, workflow_completed, created_at, updated_at";

/// Column list for workflow_transitions queries.
const TRANSITION_COLUMNS: &str = "id, task_id, from_step_id, to_step_id, changed_by, \
    comment, time_spent_minutes, created_at";

/// Provides workflow state operations on tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Find a task by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Attach a workflow definition to a task.
    ///
    /// Sets the current step to `first_step_id` (the definition's order-1
    /// step) and clears any previous completion flag.
    pub async fn assign_workflow(
        pool: &PgPool,
        task_id: DbId,
        workflow_id: DbId,
        first_step_id: Option<DbId>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks
             SET workflow_id = $2, current_step_id = $3,
                 workflow_completed = FALSE, updated_at = now()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .bind(workflow_id)
            .bind(first_step_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply an already-authorized advancement in one transaction: append
    /// the history record and move the current-step pointer. `to_step_id =
    /// None` completes the workflow.
    ///
    /// Gating (permissions, approval, edge membership) happens in
    /// `praxio_core::workflow::check_advance` before this is called; a
    /// failure inside the transaction leaves no state behind.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_advance(
        pool: &PgPool,
        task_id: DbId,
        from_step_id: Option<DbId>,
        to_step_id: Option<DbId>,
        changed_by: DbId,
        comment: Option<&str>,
        time_spent_minutes: Option<i32>,
    ) -> Result<WorkflowTransition, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workflow_transitions
                (task_id, from_step_id, to_step_id, changed_by, comment, time_spent_minutes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TRANSITION_COLUMNS}"
        );
        let transition = sqlx::query_as::<_, WorkflowTransition>(&query)
            .bind(task_id)
            .bind(from_step_id)
            .bind(to_step_id)
            .bind(changed_by)
            .bind(comment)
            .bind(time_spent_minutes)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE tasks
             SET current_step_id = $2,
                 workflow_completed = ($2 IS NULL),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(to_step_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transition)
    }
}
