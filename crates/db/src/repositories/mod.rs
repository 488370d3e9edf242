pub mod approval_repo;
pub mod task_repo;
pub mod time_entry_repo;
pub mod transition_repo;
pub mod workflow_repo;
pub mod workflow_step_repo;

pub use approval_repo::ApprovalRepo;
pub use task_repo::TaskRepo;
pub use time_entry_repo::TimeEntryRepo;
pub use transition_repo::TransitionRepo;
pub use workflow_repo::WorkflowRepo;
pub use workflow_step_repo::WorkflowStepRepo;
