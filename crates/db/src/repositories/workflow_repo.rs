//! Repository for the `workflow_definitions` table.

use praxio_core::types::DbId;
use praxio_core::workflow::StepNode;
use sqlx::PgPool;

use crate::models::workflow::{WorkflowDefinition, WorkflowSummary};
use crate::models::workflow_step::WorkflowStep;
use crate::repositories::workflow_step_repo::WorkflowStepRepo;

/// Column list for workflow_definitions queries.
const DEFINITION_COLUMNS: &str =
    "id, name, description, is_active, created_by, created_at, updated_at";

/// Provides CRUD operations for workflow definitions.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// List definition summaries, optionally filtered to active only,
    /// ordered by name ascending.
    pub async fn list(
        pool: &PgPool,
        is_active: Option<bool>,
    ) -> Result<Vec<WorkflowSummary>, sqlx::Error> {
        sqlx::query_as::<_, WorkflowSummary>(
            "SELECT
                w.id, w.name, w.description, w.is_active, w.created_at,
                COUNT(s.id) AS step_count
             FROM workflow_definitions w
             LEFT JOIN workflow_steps s ON s.workflow_id = w.id
             WHERE ($1::boolean IS NULL OR w.is_active = $1)
             GROUP BY w.id
             ORDER BY w.name ASC",
        )
        .bind(is_active)
        .fetch_all(pool)
        .await
    }

    /// Find a definition by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowDefinition>, sqlx::Error> {
        let query = format!("SELECT {DEFINITION_COLUMNS} FROM workflow_definitions WHERE id = $1");
        sqlx::query_as::<_, WorkflowDefinition>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new definition and its step set in one transaction.
    ///
    /// A failure anywhere (including step reconciliation) rolls the whole
    /// save back, so no definition row is left behind without its steps.
    pub async fn create_with_steps(
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
        is_active: bool,
        created_by: DbId,
        steps: &[StepNode],
    ) -> Result<(WorkflowDefinition, Vec<WorkflowStep>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workflow_definitions (name, description, is_active, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {DEFINITION_COLUMNS}"
        );
        let definition = sqlx::query_as::<_, WorkflowDefinition>(&query)
            .bind(name)
            .bind(description)
            .bind(is_active)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        let steps = WorkflowStepRepo::reconcile(&mut tx, definition.id, steps).await?;

        tx.commit().await?;
        Ok((definition, steps))
    }

    /// Update a definition's fields and replace its step set in one
    /// transaction. Returns `None` when the id is unknown.
    pub async fn update_with_steps(
        pool: &PgPool,
        id: DbId,
        name: &str,
        description: Option<&str>,
        is_active: bool,
        steps: &[StepNode],
    ) -> Result<Option<(WorkflowDefinition, Vec<WorkflowStep>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE workflow_definitions
             SET name = $2, description = $3, is_active = $4, updated_at = now()
             WHERE id = $1
             RETURNING {DEFINITION_COLUMNS}"
        );
        let Some(definition) = sqlx::query_as::<_, WorkflowDefinition>(&query)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(is_active)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let steps = WorkflowStepRepo::reconcile(&mut tx, id, steps).await?;

        tx.commit().await?;
        Ok(Some((definition, steps)))
    }

    /// Delete a definition; its steps cascade via FK.
    ///
    /// Returns the number of rows deleted (0 when the id was unknown).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workflow_definitions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
