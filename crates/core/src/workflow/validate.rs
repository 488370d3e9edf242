//! Structural validation of a workflow graph.
//!
//! All checks run and their errors accumulate; nothing short-circuits. The
//! result is a list of human-readable messages (empty = valid) and the save
//! path must refuse to persist while the list is non-empty.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::step::{derive_previous_steps, StepNode};
use crate::types::DbId;

/// Validate a fully-connected step list.
///
/// Checks, in order: orphaned steps, circular references, dangling edge
/// references. Cycle detection walks `next_steps` depth-first from every
/// step with per-path state (a path stack pushed and popped around each
/// descent), so a step visited on a sibling branch is never mistaken for a
/// cycle and a genuine back-edge is never missed.
pub fn validate_graph(steps: &[StepNode]) -> Vec<String> {
    let mut errors = Vec::new();

    let previous = derive_previous_steps(steps);

    // Orphan detection: only meaningful with more than one step.
    if steps.len() > 1 {
        for step in steps {
            let no_incoming = previous.get(&step.id).map_or(true, |p| p.is_empty());
            if step.next_steps.is_empty() && no_incoming {
                errors.push(format!(
                    "Step '{}' is not connected to any other step",
                    step.name
                ));
            }
        }
    }

    // Cycle detection.
    let by_id: HashMap<DbId, &StepNode> = steps.iter().map(|s| (s.id, s)).collect();
    let mut reported: HashSet<DbId> = HashSet::new();
    let mut explored: HashSet<DbId> = HashSet::new();
    for start in steps {
        let mut path: Vec<DbId> = Vec::new();
        find_cycles(start, &by_id, &mut path, &mut explored, &mut reported, &mut errors);
    }

    // Dangling reference detection.
    let id_set: HashSet<DbId> = steps.iter().map(|s| s.id).collect();
    for step in steps {
        let stray: BTreeSet<DbId> = step
            .next_steps
            .iter()
            .copied()
            .filter(|id| !id_set.contains(id))
            .collect();
        if !stray.is_empty() {
            let ids: Vec<String> = stray.iter().map(|id| id.to_string()).collect();
            errors.push(format!(
                "Step '{}' references unknown step ids: {}",
                step.name,
                ids.join(", ")
            ));
        }
    }

    errors
}

/// Depth-first walk over `next_steps` with an explicit path stack.
///
/// A step already on the current path closes a cycle and is reported once
/// (by the step where the cycle is detected); `reported` only deduplicates
/// the message. `explored` holds steps whose entire descent has finished:
/// no cycle can close through them, so they are skipped on re-entry. A step
/// is only marked explored after its descent completes, never while it sits
/// on the path, so a back-edge into the current path is always seen -- but
/// each step descends exactly once overall, keeping the walk linear even on
/// the complete graph the parallel topology generates.
fn find_cycles(
    step: &StepNode,
    by_id: &HashMap<DbId, &StepNode>,
    path: &mut Vec<DbId>,
    explored: &mut HashSet<DbId>,
    reported: &mut HashSet<DbId>,
    errors: &mut Vec<String>,
) {
    if path.contains(&step.id) {
        if reported.insert(step.id) {
            errors.push(format!(
                "Circular reference detected at step '{}'",
                step.name
            ));
        }
        return;
    }
    if explored.contains(&step.id) {
        return;
    }
    path.push(step.id);
    for next_id in &step.next_steps {
        if let Some(next) = by_id.get(next_id) {
            find_cycles(next, by_id, path, explored, reported, errors);
        }
    }
    path.pop();
    explored.insert(step.id);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::connect::{generate_connections, ConnectionMode};
    use super::*;

    fn steps(n: usize) -> Vec<StepNode> {
        (1..=n)
            .map(|i| StepNode::new(i as DbId, format!("Step {i}"), i as i32).unwrap())
            .collect()
    }

    // -- Soundness on generated graphs --------------------------------------

    #[test]
    fn sequential_graphs_are_valid() {
        for n in 2..=6 {
            let generated = generate_connections(&steps(n), ConnectionMode::Sequential);
            assert_eq!(validate_graph(&generated), Vec::<String>::new());
        }
    }

    #[test]
    fn conditional_graphs_are_valid() {
        for n in 2..=5 {
            let generated = generate_connections(&steps(n), ConnectionMode::Conditional);
            assert_eq!(validate_graph(&generated), Vec::<String>::new());
        }
    }

    // -- Orphans ------------------------------------------------------------

    #[test]
    fn disconnected_step_reported_as_orphan() {
        let mut list = generate_connections(&steps(3), ConnectionMode::Sequential);
        list.push(StepNode::new(4, "Loose end", 4).unwrap());

        let errors = validate_graph(&list);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Loose end"));
        assert!(errors[0].contains("not connected"));
    }

    #[test]
    fn single_step_is_never_an_orphan() {
        let list = steps(1);
        assert!(validate_graph(&list).is_empty());
    }

    // -- Cycles -------------------------------------------------------------

    #[test]
    fn three_step_loop_detected() {
        let mut list = steps(3);
        list[0].next_steps = vec![2];
        list[1].next_steps = vec![3];
        list[2].next_steps = vec![1];

        let errors = validate_graph(&list);
        assert!(errors.iter().any(|e| e.contains("Circular reference")));
    }

    #[test]
    fn self_loop_detected() {
        let mut list = steps(2);
        list[0].next_steps = vec![1, 2];

        let errors = validate_graph(&list);
        assert!(errors.iter().any(|e| e.contains("Circular reference")));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        // A -> B, A -> C, B -> D, C -> D: D is reached on two branches but
        // never twice on one path.
        let mut list = steps(4);
        list[0].next_steps = vec![2, 3];
        list[1].next_steps = vec![4];
        list[2].next_steps = vec![4];

        assert!(validate_graph(&list).is_empty());
    }

    #[test]
    fn cycle_behind_a_shared_branch_detected() {
        // A fans out to B and C; both reach D; D loops back to B. A shared
        // visited set would mark D done on the first branch and miss the
        // back-edge on the second.
        let mut list = steps(4);
        list[0].next_steps = vec![2, 3];
        list[1].next_steps = vec![4];
        list[2].next_steps = vec![4];
        list[3].next_steps = vec![2];

        let errors = validate_graph(&list);
        assert!(errors.iter().any(|e| e.contains("Circular reference")));
    }

    #[test]
    fn parallel_complete_graph_flags_mutual_orders_without_blowup() {
        // Every step points at every other, so mutual-order cycles exist
        // and the walk shares an enormous number of path suffixes. The
        // explored set keeps this linear; without it the walk enumerates
        // every simple path and never finishes at this size.
        let generated = generate_connections(&steps(16), ConnectionMode::Parallel);
        let errors = validate_graph(&generated);
        assert!(errors.iter().any(|e| e.contains("Circular reference")));
    }

    #[test]
    fn dense_acyclic_graph_validates_quickly() {
        // Ladder DAG: i -> i+1 and i -> i+2. The number of distinct paths
        // grows exponentially with length, but the step count does not.
        let n = 60;
        let mut list = steps(n);
        for i in 0..n {
            let mut next = Vec::new();
            if i + 1 < n {
                next.push(list[i + 1].id);
            }
            if i + 2 < n {
                next.push(list[i + 2].id);
            }
            list[i].next_steps = next;
        }
        assert!(validate_graph(&list).is_empty());
    }

    // -- Dangling references ------------------------------------------------

    #[test]
    fn unknown_next_step_id_reported() {
        let mut list = steps(2);
        list[0].next_steps = vec![2, 99];

        let errors = validate_graph(&list);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Step 1"));
        assert!(errors[0].contains("99"));
    }

    // -- Accumulation -------------------------------------------------------

    #[test]
    fn all_errors_accumulate() {
        // Orphan (4), cycle (1 <-> 2), dangling (3 -> 99) in one list.
        let mut list = steps(4);
        list[0].next_steps = vec![2];
        list[1].next_steps = vec![1];
        list[2].next_steps = vec![99];

        let errors = validate_graph(&list);
        assert!(errors.iter().any(|e| e.contains("not connected")));
        assert!(errors.iter().any(|e| e.contains("Circular reference")));
        assert!(errors.iter().any(|e| e.contains("unknown step ids")));
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(validate_graph(&[]).is_empty());
    }
}
