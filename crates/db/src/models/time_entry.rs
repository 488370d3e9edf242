//! Time-tracking models, limited to the workflow rollup queries.

use praxio_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Cumulative minutes logged against one step of one task.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StepTimeSum {
    pub workflow_step_id: DbId,
    pub minutes: i64,
}

/// One logged observation used by bottleneck analysis.
#[derive(Debug, Clone, FromRow)]
pub struct StepTimeSample {
    pub workflow_step_id: DbId,
    pub minutes: i32,
}
