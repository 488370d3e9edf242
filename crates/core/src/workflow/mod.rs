//! The workflow graph engine.
//!
//! A workflow definition is a directed graph of named steps. Authoring
//! happens against an ordered step list: connections are generated from a
//! topology mode ([`connect`]), the resulting graph is validated
//! ([`validate`]), and the step set is persisted through an explicit
//! three-way diff ([`reconcile`]). At runtime a definition is attached to a
//! task; [`advance`] gates movement of the task's current-step pointer and
//! [`progress`] derives completion figures from it.

pub mod advance;
pub mod analyze;
pub mod connect;
pub mod progress;
pub mod reconcile;
pub mod step;
pub mod validate;

pub use advance::{check_advance, check_approve, ApprovalRecord};
pub use analyze::{analyze_bottlenecks, AnalysisReport, Bottleneck, StepSample};
pub use connect::{generate_connections, ConnectionMode};
pub use progress::{workflow_progress, WorkflowProgress};
pub use reconcile::{diff_steps, StepDiff};
pub use step::{derive_previous_steps, move_step, renumber, StepNode};
pub use validate::validate_graph;
