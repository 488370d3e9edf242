//! Workflow definition models.

use praxio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::workflow_step::StepInput;

/// A row from the `workflow_definitions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowDefinition {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A definition summary for list views, including its step count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub step_count: i64,
    pub created_at: Timestamp,
}

/// Request body for creating a workflow definition with its step set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkflowDefinition {
    #[validate(length(min = 1, message = "Workflow name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// The full step set, in display order.
    #[validate(nested)]
    pub steps: Vec<StepInput>,
}

/// Request body for updating a definition and replacing its step set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkflowDefinition {
    #[validate(length(min = 1, message = "Workflow name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// The full replacement step set, in display order.
    #[validate(nested)]
    pub steps: Vec<StepInput>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn step(name: &str) -> StepInput {
        StepInput {
            id: None,
            name: name.into(),
            description: None,
            assign_to: None,
            requires_approval: false,
            approver_role: None,
            next_steps: vec![],
        }
    }

    #[test]
    fn empty_workflow_name_fails_validation() {
        let input = CreateWorkflowDefinition {
            name: String::new(),
            description: None,
            is_active: true,
            steps: vec![step("Draft")],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn empty_step_name_fails_nested_validation() {
        let input = UpdateWorkflowDefinition {
            name: "Month-end close".into(),
            description: None,
            is_active: true,
            steps: vec![step("Draft"), step("")],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn well_formed_payload_passes_validation() {
        let input = CreateWorkflowDefinition {
            name: "Month-end close".into(),
            description: Some("Recurring close".into()),
            is_active: true,
            steps: vec![step("Draft"), step("Review")],
        };
        assert!(input.validate().is_ok());
    }
}
