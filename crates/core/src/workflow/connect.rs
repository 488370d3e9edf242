//! Connection generation: derive a step list's edges from a topology mode.
//!
//! Generation is a one-time authoring directive, never persisted. It always
//! returns a new list so a preview can be discarded without touching the
//! author's working copy.

use serde::{Deserialize, Serialize};

use super::step::StepNode;

/// How to (re)compute `next_steps` from an ordered step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Each step points to the next one in order.
    Sequential,
    /// Branch-then-merge diamond: the first step fans out to every other
    /// step, intermediates each point to the last step.
    Conditional,
    /// Complete graph: any step may run before or after any other.
    Parallel,
    /// Keep whatever edges already exist (edges hand-edited elsewhere).
    Custom,
}

/// Recompute the edges of `steps` according to `mode`.
///
/// Returns a copy; the input is never mutated. With fewer than two steps
/// there is nothing to connect and the list is returned unchanged.
///
/// The conditional diamond special-cases the first and last step and is a
/// fixed business rule, not a generalized DAG builder: it cannot express
/// multiple independent branch-merge groups.
pub fn generate_connections(steps: &[StepNode], mode: ConnectionMode) -> Vec<StepNode> {
    let mut out: Vec<StepNode> = steps.to_vec();
    if out.len() < 2 || mode == ConnectionMode::Custom {
        return out;
    }

    for step in &mut out {
        step.next_steps.clear();
    }
    let n = out.len();

    match mode {
        ConnectionMode::Sequential => {
            for i in 0..n - 1 {
                let next_id = out[i + 1].id;
                out[i].next_steps = vec![next_id];
            }
        }
        ConnectionMode::Conditional => {
            // First step fans out to every other step (with exactly two
            // steps that is just the direct edge to the last).
            let fan_out: Vec<_> = out[1..].iter().map(|s| s.id).collect();
            out[0].next_steps = fan_out;
            // Intermediates merge into the last step.
            let last_id = out[n - 1].id;
            for step in &mut out[1..n - 1] {
                step.next_steps = vec![last_id];
            }
        }
        ConnectionMode::Parallel => {
            let ids: Vec<_> = out.iter().map(|s| s.id).collect();
            for (i, step) in out.iter_mut().enumerate() {
                step.next_steps = ids
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &id)| id)
                    .collect();
            }
        }
        ConnectionMode::Custom => unreachable!("handled above"),
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
