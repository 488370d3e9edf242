//! Repository for the `workflow_transitions` table (read side; inserts
//! happen inside `TaskRepo::apply_advance`).

use praxio_core::types::DbId;
use sqlx::PgPool;

use crate::models::transition::WorkflowTransition;

/// Column list for workflow_transitions queries.
const TRANSITION_COLUMNS: &str = "id, task_id, from_step_id, to_step_id, changed_by, \
    comment, time_spent_minutes, created_at";

/// Provides read operations for workflow transition history.
pub struct TransitionRepo;

impl TransitionRepo {
    /// List a task's transition history, oldest first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<WorkflowTransition>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSITION_COLUMNS} FROM workflow_transitions
             WHERE task_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, WorkflowTransition>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }
}
