//! Task models, limited to the columns the workflow engine touches.

use praxio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub client_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    /// The attached workflow definition, if any.
    pub workflow_id: Option<DbId>,
    /// The step currently active for this task; `NULL` both before the
    /// workflow starts and after it completes (`workflow_completed`
    /// disambiguates).
    pub current_step_id: Option<DbId>,
    pub workflow_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
