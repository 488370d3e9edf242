//! Rollup queries over the `time_entries` table.

use praxio_core::types::DbId;
use sqlx::PgPool;

use crate::models::time_entry::{StepTimeSample, StepTimeSum};

/// Provides time-tracking rollups for workflow views.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Cumulative minutes logged per step for one task.
    pub async fn sums_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<StepTimeSum>, sqlx::Error> {
        sqlx::query_as::<_, StepTimeSum>(
            "SELECT workflow_step_id, SUM(minutes)::bigint AS minutes
             FROM time_entries
             WHERE task_id = $1 AND workflow_step_id IS NOT NULL
             GROUP BY workflow_step_id",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    /// Every logged observation against steps of one definition, across all
    /// tasks using it. Input for bottleneck analysis.
    pub async fn samples_for_workflow(
        pool: &PgPool,
        workflow_id: DbId,
    ) -> Result<Vec<StepTimeSample>, sqlx::Error> {
        sqlx::query_as::<_, StepTimeSample>(
            "SELECT t.workflow_step_id, t.minutes
             FROM time_entries t
             JOIN workflow_steps s ON s.id = t.workflow_step_id
             WHERE s.workflow_id = $1",
        )
        .bind(workflow_id)
        .fetch_all(pool)
        .await
    }
}
