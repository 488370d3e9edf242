//! Workflow step models and their mapping to the core step entity.

use praxio_core::types::{DbId, Timestamp};
use praxio_core::workflow::StepNode;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `workflow_steps` table.
///
/// `next_steps` is the persisted edge set (JSONB id array); incoming edges
/// are derived at read time by the handlers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowStep {
    pub id: DbId,
    pub workflow_id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "order")]
    pub step_order: i32,
    pub assign_to: Option<DbId>,
    pub requires_approval: bool,
    pub approver_role: Option<String>,
    pub next_steps: Json<Vec<DbId>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkflowStep {
    /// View this row as a core graph node.
    pub fn to_node(&self) -> StepNode {
        StepNode {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            order: self.step_order,
            assign_to: self.assign_to,
            requires_approval: self.requires_approval,
            approver_role: self.approver_role.clone(),
            next_steps: self.next_steps.0.clone(),
        }
    }
}

/// Convert a step list to core nodes for generation/validation/gating.
pub fn to_nodes(steps: &[WorkflowStep]) -> Vec<StepNode> {
    steps.iter().map(WorkflowStep::to_node).collect()
}

/// One step in a definition save payload.
///
/// Unsaved steps omit `id` or send the client's negative placeholder;
/// `next_steps` may reference those placeholders and is remapped to real
/// ids inside the reconciliation transaction. `order` is assigned from list
/// position server-side, so it stays dense regardless of what the client
/// sends.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StepInput {
    pub id: Option<DbId>,
    #[validate(length(min = 1, message = "Step name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub assign_to: Option<DbId>,
    #[serde(default)]
    pub requires_approval: bool,
    pub approver_role: Option<String>,
    #[serde(default)]
    pub next_steps: Vec<DbId>,
}

/// Base for synthetic placeholder ids handed to steps that arrive without
/// one. Client placeholders are small negative counters or negative
/// millisecond timestamps; allocating far below `i64::MIN / 2` keeps the
/// two ranges disjoint so no two steps in one payload can share an id.
const SYNTHETIC_ID_BASE: DbId = i64::MIN / 2;

impl StepInput {
    /// Build the core node for this input, at 1-based position `position`.
    ///
    /// Steps without an id get a synthetic placeholder derived from their
    /// position, distinct from any real id and from any client placeholder.
    pub fn to_node(&self, position: usize) -> StepNode {
        StepNode {
            id: self.id.unwrap_or(SYNTHETIC_ID_BASE - position as DbId),
            name: self.name.clone(),
            description: self.description.clone(),
            order: position as i32,
            assign_to: self.assign_to,
            requires_approval: self.requires_approval,
            approver_role: self.approver_role.clone(),
            next_steps: self.next_steps.clone(),
        }
    }
}

/// Request body for single-step create.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkflowStep {
    pub workflow: DbId,
    #[validate(length(min = 1, message = "Step name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub assign_to: Option<DbId>,
    #[serde(default)]
    pub requires_approval: bool,
    pub approver_role: Option<String>,
    #[serde(default)]
    pub next_steps: Vec<DbId>,
}

/// Request body for single-step update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkflowStep {
    #[validate(length(min = 1, message = "Step name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub assign_to: Option<DbId>,
    pub requires_approval: bool,
    pub approver_role: Option<String>,
    pub next_steps: Vec<DbId>,
}

/// A step as returned by the API: the row plus its derived incoming edges.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStepView {
    #[serde(flatten)]
    pub step: WorkflowStep,
    pub previous_steps: Vec<DbId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_input_placeholder_ids_are_negative_and_distinct() {
        let input = StepInput {
            id: None,
            name: "Draft".into(),
            description: None,
            assign_to: None,
            requires_approval: false,
            approver_role: None,
            next_steps: vec![],
        };
        let a = input.to_node(1);
        let b = input.to_node(2);
        assert!(a.id < 0 && b.id < 0);
        assert_ne!(a.id, b.id);
        assert_eq!(a.order, 1);
        assert_eq!(b.order, 2);
    }

    #[test]
    fn synthetic_ids_cannot_collide_with_client_placeholders() {
        // A counter-style client placeholder next to an id-less step at the
        // matching position must not end up sharing one id, or the save's
        // temp-to-real remapping would collapse the two steps.
        let with_counter_id = StepInput {
            id: Some(-1),
            name: "Draft".into(),
            description: None,
            assign_to: None,
            requires_approval: false,
            approver_role: None,
            next_steps: vec![],
        };
        let without_id = StepInput {
            id: None,
            name: "Review".into(),
            description: None,
            assign_to: None,
            requires_approval: false,
            approver_role: None,
            next_steps: vec![],
        };
        let a = with_counter_id.to_node(2);
        let b = without_id.to_node(1);
        assert_eq!(a.id, -1);
        assert_ne!(a.id, b.id);
        // Timestamp-scale placeholders stay clear of the synthetic range too.
        let c = StepInput {
            id: Some(-1_700_000_000_000),
            ..without_id.clone()
        };
        assert_ne!(c.to_node(3).id, without_id.to_node(3).id);
    }

    #[test]
    fn client_placeholder_id_is_preserved() {
        let input = StepInput {
            id: Some(-1_700_000_000_000),
            name: "Draft".into(),
            description: None,
            assign_to: None,
            requires_approval: false,
            approver_role: None,
            next_steps: vec![-1_700_000_000_001],
        };
        let node = input.to_node(1);
        assert_eq!(node.id, -1_700_000_000_000);
        assert_eq!(node.next_steps, vec![-1_700_000_000_001]);
    }
}
