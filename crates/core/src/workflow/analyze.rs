//! Bottleneck analysis over logged step times.
//!
//! Advisory only: compares each step's average logged minutes against the
//! overall average across the workflow and suggests follow-ups. Nothing
//! here affects the correctness of the graph or the advancement protocol.

use std::collections::HashMap;

use serde::Serialize;

use super::step::StepNode;
use crate::types::DbId;

/// One logged time observation against a step (minutes).
#[derive(Debug, Clone)]
pub struct StepSample {
    pub step_id: DbId,
    pub minutes: i64,
}

/// A step whose average time exceeds the workflow-wide average.
#[derive(Debug, Clone, Serialize)]
pub struct Bottleneck {
    pub step_id: DbId,
    pub step_name: String,
    pub avg_time: f64,
    pub overall_avg: f64,
}

/// Analysis output: bottlenecks sorted worst-first plus suggestion strings.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub bottlenecks: Vec<Bottleneck>,
    pub suggestions: Vec<String>,
}

/// Find steps whose average logged time exceeds the overall average.
///
/// Samples against unknown step ids are ignored. With no samples the report
/// is empty.
pub fn analyze_bottlenecks(steps: &[StepNode], samples: &[StepSample]) -> AnalysisReport {
    let by_id: HashMap<DbId, &StepNode> = steps.iter().map(|s| (s.id, s)).collect();

    let mut totals: HashMap<DbId, (i64, usize)> = HashMap::new();
    let mut grand_total = 0i64;
    let mut grand_count = 0usize;
    for sample in samples {
        if !by_id.contains_key(&sample.step_id) {
            continue;
        }
        let entry = totals.entry(sample.step_id).or_insert((0, 0));
        entry.0 += sample.minutes;
        entry.1 += 1;
        grand_total += sample.minutes;
        grand_count += 1;
    }

    if grand_count == 0 {
        return AnalysisReport {
            bottlenecks: Vec::new(),
            suggestions: Vec::new(),
        };
    }
    let overall_avg = grand_total as f64 / grand_count as f64;

    let mut bottlenecks: Vec<Bottleneck> = totals
        .iter()
        .filter_map(|(&step_id, &(total, count))| {
            let avg_time = total as f64 / count as f64;
            if avg_time > overall_avg {
                Some(Bottleneck {
                    step_id,
                    step_name: by_id[&step_id].name.clone(),
                    avg_time,
                    overall_avg,
                })
            } else {
                None
            }
        })
        .collect();
    bottlenecks.sort_by(|a, b| {
        b.avg_time
            .partial_cmp(&a.avg_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let suggestions = bottlenecks
        .iter()
        .map(|b| suggestion_for(&by_id[&b.step_id], b))
        .collect();

    AnalysisReport {
        bottlenecks,
        suggestions,
    }
}

fn suggestion_for(step: &StepNode, bottleneck: &Bottleneck) -> String {
    if step.assign_to.is_none() {
        format!(
            "Step '{}' averages {:.0} minutes against a workflow average of {:.0} and is unassigned; assigning an owner may reduce waiting time",
            step.name, bottleneck.avg_time, bottleneck.overall_avg
        )
    } else if step.requires_approval {
        format!(
            "Step '{}' averages {:.0} minutes against a workflow average of {:.0}; review the approver's workload for this approval gate",
            step.name, bottleneck.avg_time, bottleneck.overall_avg
        )
    } else {
        format!(
            "Step '{}' averages {:.0} minutes against a workflow average of {:.0}; consider splitting it into smaller steps",
            step.name, bottleneck.avg_time, bottleneck.overall_avg
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
