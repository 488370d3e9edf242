pub mod approval;
pub mod task;
pub mod time_entry;
pub mod transition;
pub mod workflow;
pub mod workflow_step;
