//! Gating decisions for the advancement protocol.
//!
//! Pure checks over explicit inputs: the current and target steps, the
//! task's approval records, and the acting user's [`Capabilities`]. The
//! repository layer applies the transition in one transaction only after
//! these checks pass, so a rejected call leaves no state behind.

use super::step::StepNode;
use crate::error::CoreError;
use crate::permissions::Capabilities;
use crate::types::DbId;

/// A recorded sign-off on a workflow step, as the gating checks see it.
#[derive(Debug, Clone)]
pub struct ApprovalRecord {
    pub workflow_step: DbId,
    pub approved: bool,
}

/// Check whether `caps` may advance a task from `current` to `target`.
///
/// `current = None` means the workflow has not started; `target = None`
/// means "complete the workflow", valid only from a step with no outgoing
/// edges. A target must lie on an outgoing edge of the current step. When
/// the current step requires approval, an `approved = true` record for it
/// must exist.
///
/// Repeated advances are not deduplicated; every successful call appends a
/// transition record downstream.
pub fn check_advance(
    current: Option<&StepNode>,
    target: Option<&StepNode>,
    approvals: &[ApprovalRecord],
    caps: &Capabilities,
) -> Result<(), CoreError> {
    // Permission: org admin, blanket task edit, or assignee of the current
    // step. Before the first step exists, the target's assignee may start
    // the workflow.
    let is_assignee = match current {
        Some(step) => step.assign_to == Some(caps.user_id),
        None => target.and_then(|s| s.assign_to) == Some(caps.user_id),
    };
    if !caps.can_edit_any_task() && !is_assignee {
        return Err(CoreError::Forbidden(
            "You do not have permission to advance this workflow".into(),
        ));
    }

    match (current, target) {
        (None, None) => {
            return Err(CoreError::Validation(
                "Workflow has not started; there is nothing to complete".into(),
            ));
        }
        (None, Some(_)) => {
            // Starting the workflow: any step may be the entry point.
        }
        (Some(step), Some(next)) => {
            if !step.next_steps.contains(&next.id) {
                return Err(CoreError::Validation(format!(
                    "'{}' is not a valid transition from '{}'",
                    next.name, step.name
                )));
            }
        }
        (Some(step), None) => {
            if !step.next_steps.is_empty() {
                return Err(CoreError::Validation(format!(
                    "'{}' still has outgoing steps; the workflow cannot be completed here",
                    step.name
                )));
            }
        }
    }

    if let Some(step) = current {
        if step.requires_approval && !is_step_approved(step.id, approvals) {
            return Err(CoreError::Validation(format!(
                "Step '{}' requires approval before advancing",
                step.name
            )));
        }
    }

    Ok(())
}

/// Check whether `caps` may record an approval on `step`.
///
/// The step must actually require approval; approving does not itself
/// advance the workflow.
pub fn check_approve(step: &StepNode, caps: &Capabilities) -> Result<(), CoreError> {
    if !step.requires_approval {
        return Err(CoreError::Validation(format!(
            "Step '{}' does not require approval",
            step.name
        )));
    }
    if !caps.can_approve() {
        return Err(CoreError::Forbidden(
            "You do not have permission to approve workflow steps".into(),
        ));
    }
    Ok(())
}

fn is_step_approved(step_id: DbId, approvals: &[ApprovalRecord]) -> bool {
    approvals
        .iter()
        .any(|a| a.workflow_step == step_id && a.approved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
