pub mod approvals;
pub mod tasks;
pub mod workflow_definitions;
pub mod workflow_steps;
