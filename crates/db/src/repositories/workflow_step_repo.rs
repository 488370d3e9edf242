//! Repository for the `workflow_steps` table, including the transactional
//! step-set reconciliation that backs definition saves.

use std::collections::HashMap;

use praxio_core::types::DbId;
use praxio_core::workflow::{diff_steps, StepNode};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::workflow_step::WorkflowStep;

/// Column list for workflow_steps queries.
const STEP_COLUMNS: &str = "id, workflow_id, name, description, step_order, assign_to, \
    requires_approval, approver_role, next_steps, created_at, updated_at";

/// Provides CRUD and reconciliation for workflow steps.
pub struct WorkflowStepRepo;

impl WorkflowStepRepo {
    /// List a definition's steps in display order.
    pub async fn list_for_workflow(
        pool: &PgPool,
        workflow_id: DbId,
    ) -> Result<Vec<WorkflowStep>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM workflow_steps
             WHERE workflow_id = $1
             ORDER BY step_order ASC"
        );
        sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Find a step by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkflowStep>, sqlx::Error> {
        let query = format!("SELECT {STEP_COLUMNS} FROM workflow_steps WHERE id = $1");
        sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a single step at the end of its workflow's order.
    pub async fn create(
        pool: &PgPool,
        workflow_id: DbId,
        node: &StepNode,
    ) -> Result<WorkflowStep, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_steps
                (workflow_id, name, description, step_order, assign_to,
                 requires_approval, approver_role, next_steps)
             VALUES ($1, $2, $3,
                 (SELECT COALESCE(MAX(step_order), 0) + 1 FROM workflow_steps WHERE workflow_id = $1),
                 $4, $5, $6, $7)
             RETURNING {STEP_COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(workflow_id)
            .bind(&node.name)
            .bind(&node.description)
            .bind(node.assign_to)
            .bind(node.requires_approval)
            .bind(&node.approver_role)
            .bind(Json(&node.next_steps))
            .fetch_one(pool)
            .await
    }

    /// Update a single step's editable fields.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        node: &StepNode,
    ) -> Result<Option<WorkflowStep>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_steps
             SET name = $2, description = $3, assign_to = $4,
                 requires_approval = $5, approver_role = $6, next_steps = $7,
                 updated_at = now()
             WHERE id = $1
             RETURNING {STEP_COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(id)
            .bind(&node.name)
            .bind(&node.description)
            .bind(node.assign_to)
            .bind(node.requires_approval)
            .bind(&node.approver_role)
            .bind(Json(&node.next_steps))
            .fetch_optional(pool)
            .await
    }

    /// Delete a step and scrub it from its siblings' edge sets, atomically.
    ///
    /// Returns the number of step rows deleted (0 when the id was unknown).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let workflow_id: Option<DbId> =
            sqlx::query_scalar("SELECT workflow_id FROM workflow_steps WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(workflow_id) = workflow_id else {
            return Ok(0);
        };

        sqlx::query(
            "UPDATE workflow_steps
             SET next_steps = (
                    SELECT COALESCE(jsonb_agg(e), '[]'::jsonb)
                    FROM jsonb_array_elements(next_steps) e
                    WHERE e <> to_jsonb($2::bigint)
                 ),
                 updated_at = now()
             WHERE workflow_id = $1 AND next_steps @> to_jsonb($2::bigint)",
        )
        .bind(workflow_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM workflow_steps WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Replace a definition's step set with `local` inside the caller's
    /// transaction (the definition save commits the step rewrite and its
    /// own row together, so a failure leaves neither behind).
    ///
    /// `local` is the authoritative list in display order (dense 1-based
    /// `order` already assigned). The persisted set is fetched fresh and
    /// locked; the three-way diff decides which rows to insert, update, or
    /// delete. Creates are inserted with empty edges first so every step
    /// has a real id, then all surviving rows get their `next_steps`
    /// rewritten with temporary ids remapped -- so an edge between two
    /// unsaved steps lands correctly in one save.
    pub async fn reconcile(
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: DbId,
        local: &[StepNode],
    ) -> Result<Vec<WorkflowStep>, sqlx::Error> {
        let remote_ids: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM workflow_steps WHERE workflow_id = $1 ORDER BY step_order FOR UPDATE",
        )
        .bind(workflow_id)
        .fetch_all(&mut **tx)
        .await?;

        let diff = diff_steps(local, &remote_ids);

        for id in &diff.to_delete {
            sqlx::query("DELETE FROM workflow_steps WHERE id = $1 AND workflow_id = $2")
                .bind(id)
                .bind(workflow_id)
                .execute(&mut **tx)
                .await?;
        }

        // Insert creates with empty edges; remember placeholder -> real id.
        let mut id_map: HashMap<DbId, DbId> = HashMap::new();
        for node in &diff.to_create {
            let new_id: DbId = sqlx::query_scalar(
                "INSERT INTO workflow_steps
                    (workflow_id, name, description, step_order, assign_to,
                     requires_approval, approver_role, next_steps)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, '[]'::jsonb)
                 RETURNING id",
            )
            .bind(workflow_id)
            .bind(&node.name)
            .bind(&node.description)
            .bind(node.order)
            .bind(node.assign_to)
            .bind(node.requires_approval)
            .bind(&node.approver_role)
            .fetch_one(&mut **tx)
            .await?;
            id_map.insert(node.id, new_id);
        }

        // Rewrite every surviving row with remapped edges and fresh order.
        for node in local {
            let real_id = id_map.get(&node.id).copied().unwrap_or(node.id);
            let next_steps: Vec<DbId> = node
                .next_steps
                .iter()
                .map(|id| id_map.get(id).copied().unwrap_or(*id))
                .collect();

            sqlx::query(
                "UPDATE workflow_steps
                 SET name = $3, description = $4, step_order = $5, assign_to = $6,
                     requires_approval = $7, approver_role = $8, next_steps = $9,
                     updated_at = now()
                 WHERE id = $1 AND workflow_id = $2",
            )
            .bind(real_id)
            .bind(workflow_id)
            .bind(&node.name)
            .bind(&node.description)
            .bind(node.order)
            .bind(node.assign_to)
            .bind(node.requires_approval)
            .bind(&node.approver_role)
            .bind(Json(&next_steps))
            .execute(&mut **tx)
            .await?;
        }

        let query = format!(
            "SELECT {STEP_COLUMNS} FROM workflow_steps
             WHERE workflow_id = $1
             ORDER BY step_order ASC"
        );
        let steps = sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(workflow_id)
            .fetch_all(&mut **tx)
            .await?;

        tracing::debug!(
            workflow_id,
            created = diff.to_create.len(),
            updated = diff.to_update.len(),
            deleted = diff.to_delete.len(),
            "Workflow step set reconciled"
        );

        Ok(steps)
    }
}
