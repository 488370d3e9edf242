//! The step entity and ordered-list helpers.
//!
//! A step is a pure data holder; the only invariants enforced here are a
//! non-empty name and a dense, 1-based `order` across the owning list.
//! `previous_steps` is never stored: it is derived from the `next_steps` of
//! all sibling steps so the two views cannot diverge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// One node in a workflow graph.
///
/// Unsaved steps carry client-generated temporary ids (negative values);
/// real BIGSERIAL ids are assigned at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepNode {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// 1-based display and fallback-sequencing position, dense and unique
    /// within a workflow.
    pub order: i32,
    /// Assigned user; `None` means unassigned / general.
    pub assign_to: Option<DbId>,
    pub requires_approval: bool,
    /// Free-text role label, meaningful only when `requires_approval`.
    /// Not cleared when `requires_approval` is toggled off.
    pub approver_role: Option<String>,
    /// Outgoing edges: ids of steps this step can transition to.
    pub next_steps: Vec<DbId>,
}

impl StepNode {
    /// Build a step with the given id, name, and order.
    ///
    /// Fails when the name is empty or whitespace-only.
    pub fn new(id: DbId, name: impl Into<String>, order: i32) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Step name must not be empty".into()));
        }
        Ok(Self {
            id,
            name,
            description: None,
            order,
            assign_to: None,
            requires_approval: false,
            approver_role: None,
            next_steps: Vec::new(),
        })
    }

    /// True when this step has a persisted (server-issued) id.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

/// Compute the incoming-edge map for a step list.
///
/// Returns, for every step id, the sorted ids of steps whose `next_steps`
/// contain it. Edges pointing at unknown ids are skipped here; the
/// validator reports those separately.
pub fn derive_previous_steps(steps: &[StepNode]) -> BTreeMap<DbId, Vec<DbId>> {
    let mut previous: BTreeMap<DbId, Vec<DbId>> =
        steps.iter().map(|s| (s.id, Vec::new())).collect();
    for step in steps {
        for &target in &step.next_steps {
            if let Some(sources) = previous.get_mut(&target) {
                sources.push(step.id);
            }
        }
    }
    for sources in previous.values_mut() {
        sources.sort_unstable();
        sources.dedup();
    }
    previous
}

/// Reassign `order` so it is dense and 1-based, following list position.
///
/// Called after every add, remove, or move so `order` stays authoritative
/// for display and linear-fallback sequencing.
pub fn renumber(steps: &mut [StepNode]) {
    for (index, step) in steps.iter_mut().enumerate() {
        step.order = index as i32 + 1;
    }
}

/// Move the step at `from` to position `to`, renumbering afterwards.
///
/// Moving a step one position swaps exactly the two affected `order`
/// values; all other steps keep theirs.
pub fn move_step(steps: &mut Vec<StepNode>, from: usize, to: usize) -> Result<(), CoreError> {
    if from >= steps.len() || to >= steps.len() {
        return Err(CoreError::Validation(format!(
            "Step position out of range: {from} -> {to} with {} steps",
            steps.len()
        )));
    }
    let step = steps.remove(from);
    steps.insert(to, step);
    renumber(steps);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
