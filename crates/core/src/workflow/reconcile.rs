//! Three-way diff of a workflow's step set against its persisted state.
//!
//! Saving a definition replaces its full step set. Rather than interleaving
//! imperative create/update/delete calls, the diff is computed explicitly
//! against the *freshly fetched* persisted ids (step ids are authoritative
//! only once persisted; the client's cache is not trusted) and applied in
//! one transaction by the repository layer.

use std::collections::HashSet;

use super::step::StepNode;
use crate::types::DbId;

/// The outcome of diffing local (client) steps against persisted ids.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDiff {
    /// Local steps without a persisted id: to be inserted. Their temporary
    /// ids are remapped to server-issued ids by the caller.
    pub to_create: Vec<StepNode>,
    /// Local steps whose id exists server-side: to be updated in place.
    pub to_update: Vec<StepNode>,
    /// Persisted ids absent from the local list: to be deleted.
    pub to_delete: Vec<DbId>,
}

/// Compute the create/update/delete partition.
///
/// A local step claiming a persisted id the server no longer has is treated
/// as a create (the server fetch is authoritative; the row was deleted out
/// from under the client).
pub fn diff_steps(local: &[StepNode], remote_ids: &[DbId]) -> StepDiff {
    let remote: HashSet<DbId> = remote_ids.iter().copied().collect();

    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    let mut kept: HashSet<DbId> = HashSet::new();

    for step in local {
        if step.is_persisted() && remote.contains(&step.id) {
            kept.insert(step.id);
            to_update.push(step.clone());
        } else {
            to_create.push(step.clone());
        }
    }

    let to_delete: Vec<DbId> = remote_ids
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    StepDiff {
        to_create,
        to_update,
        to_delete,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
