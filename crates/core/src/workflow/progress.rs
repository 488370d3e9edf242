//! Derived progress figures for a workflow instance.
//!
//! Progress is never stored: it is a pure function of the definition's step
//! list and the task's current-step pointer.

use serde::Serialize;

use super::step::StepNode;

/// Completion figures for one task's progress through a workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowProgress {
    pub total_steps: usize,
    /// Steps with `order` below the current step's (all steps once the
    /// workflow has completed).
    pub completed_steps: usize,
    /// `completed / total * 100`; 0 for an empty or unstarted workflow.
    pub percentage: f64,
    pub is_completed: bool,
}

/// Compute progress from the step list and the current step's order.
///
/// `current_order` is `None` both before the workflow starts and after it
/// completes; `is_completed` disambiguates.
pub fn workflow_progress(
    steps: &[StepNode],
    current_order: Option<i32>,
    is_completed: bool,
) -> WorkflowProgress {
    let total_steps = steps.len();

    let completed_steps = if is_completed {
        total_steps
    } else {
        match current_order {
            Some(current) => steps.iter().filter(|s| s.order < current).count(),
            None => 0,
        }
    };

    let percentage = if total_steps == 0 {
        0.0
    } else {
        completed_steps as f64 / total_steps as f64 * 100.0
    };

    WorkflowProgress {
        total_steps,
        completed_steps,
        percentage,
        is_completed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbId;

    fn steps(n: usize) -> Vec<StepNode> {
        (1..=n)
            .map(|i| StepNode::new(i as DbId, format!("Step {i}"), i as i32).unwrap())
            .collect()
    }

    #[test]
    fn midway_progress() {
        let progress = workflow_progress(&steps(5), Some(3), false);
        assert_eq!(progress.completed_steps, 2);
        assert_eq!(progress.percentage, 40.0);
        assert!(!progress.is_completed);
    }

    #[test]
    fn not_started() {
        let progress = workflow_progress(&steps(5), None, false);
        assert_eq!(progress.completed_steps, 0);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn completed_counts_every_step() {
        let progress = workflow_progress(&steps(4), None, true);
        assert_eq!(progress.completed_steps, 4);
        assert_eq!(progress.percentage, 100.0);
        assert!(progress.is_completed);
    }

    #[test]
    fn first_step_active_means_nothing_done() {
        let progress = workflow_progress(&steps(3), Some(1), false);
        assert_eq!(progress.completed_steps, 0);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn empty_workflow_is_zero_percent() {
        let progress = workflow_progress(&[], None, false);
        assert_eq!(progress.total_steps, 0);
        assert_eq!(progress.percentage, 0.0);
    }
}
