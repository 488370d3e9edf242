//! End-to-end exercise of the workflow engine's pure layer: author a
//! three-step review workflow, generate and validate its graph, then drive
//! a task through it with approval gating, mirroring what the API layer
//! does around the database.

use praxio_core::permissions::Capabilities;
use praxio_core::types::DbId;
use praxio_core::workflow::{
    check_advance, check_approve, generate_connections, validate_graph, workflow_progress,
    ApprovalRecord, ConnectionMode, StepNode,
};

/// In-memory stand-in for a task's workflow state, mutated only after the
/// gating checks pass -- the same discipline the repository layer applies
/// inside a transaction.
struct Instance {
    steps: Vec<StepNode>,
    current_step_id: Option<DbId>,
    is_completed: bool,
    approvals: Vec<ApprovalRecord>,
    history: Vec<(Option<DbId>, Option<DbId>)>,
}

impl Instance {
    fn attach(steps: Vec<StepNode>) -> Self {
        let first = steps.iter().find(|s| s.order == 1).map(|s| s.id);
        Self {
            steps,
            current_step_id: first,
            is_completed: false,
            approvals: Vec::new(),
            history: Vec::new(),
        }
    }

    fn step(&self, id: DbId) -> Option<&StepNode> {
        self.steps.iter().find(|s| s.id == id)
    }

    fn current(&self) -> Option<&StepNode> {
        self.current_step_id.and_then(|id| self.step(id))
    }

    fn advance(&mut self, target: Option<DbId>, caps: &Capabilities) -> Result<(), String> {
        let target_step = target.and_then(|id| self.step(id));
        check_advance(self.current(), target_step, &self.approvals, caps)
            .map_err(|e| e.to_string())?;

        self.history.push((self.current_step_id, target));
        self.current_step_id = target;
        if target.is_none() {
            self.is_completed = true;
        }
        Ok(())
    }

    fn approve(&mut self, step_id: DbId, caps: &Capabilities) -> Result<(), String> {
        let step = self.step(step_id).ok_or("unknown step")?;
        check_approve(step, caps).map_err(|e| e.to_string())?;
        self.approvals.push(ApprovalRecord {
            workflow_step: step_id,
            approved: true,
        });
        Ok(())
    }
}

#[test]
fn review_workflow_end_to_end() {
    // Author the definition: Draft -> Review (approval-gated) -> Publish.
    let mut steps = vec![
        StepNode::new(1, "Draft", 1).unwrap(),
        StepNode::new(2, "Review", 2).unwrap(),
        StepNode::new(3, "Publish", 3).unwrap(),
    ];
    steps[1].requires_approval = true;
    steps[1].approver_role = Some("Senior Accountant".into());

    let connected = generate_connections(&steps, ConnectionMode::Sequential);
    assert_eq!(validate_graph(&connected), Vec::<String>::new());

    // Attach to a task: the order-1 step becomes current.
    let mut instance = Instance::attach(connected);
    assert_eq!(instance.current().unwrap().name, "Draft");

    let manager = Capabilities {
        user_id: 10,
        is_org_admin: false,
        can_edit_all_tasks: true,
        can_approve_tasks: true,
    };

    // Draft -> Review succeeds.
    instance.advance(Some(2), &manager).unwrap();
    assert_eq!(instance.current().unwrap().name, "Review");

    // Review -> Publish is blocked until the step is approved.
    let err = instance.advance(Some(3), &manager).unwrap_err();
    assert!(err.contains("requires approval"));
    assert_eq!(instance.current().unwrap().name, "Review");
    assert_eq!(instance.history.len(), 1);

    // Approve, then advance.
    instance.approve(2, &manager).unwrap();
    instance.advance(Some(3), &manager).unwrap();
    assert_eq!(instance.current().unwrap().name, "Publish");

    // Two of three steps behind us.
    let progress = workflow_progress(
        &instance.steps,
        instance.current().map(|s| s.order),
        instance.is_completed,
    );
    assert_eq!(progress.completed_steps, 2);
    assert!((progress.percentage - 66.666).abs() < 0.01);
    assert!(!progress.is_completed);

    // Publish is terminal; completing finishes the workflow.
    instance.advance(None, &manager).unwrap();
    assert!(instance.is_completed);
    let done = workflow_progress(&instance.steps, None, true);
    assert_eq!(done.percentage, 100.0);
    assert_eq!(instance.history.len(), 3);
}

#[test]
fn staff_member_cannot_drive_someone_elses_task() {
    let mut steps = vec![
        StepNode::new(1, "Prepare", 1).unwrap(),
        StepNode::new(2, "File", 2).unwrap(),
    ];
    steps[0].assign_to = Some(4);
    let connected = generate_connections(&steps, ConnectionMode::Sequential);
    let mut instance = Instance::attach(connected);

    let outsider = Capabilities::member(99);
    let err = instance.advance(Some(2), &outsider).unwrap_err();
    assert!(err.contains("permission"));
    assert!(instance.history.is_empty());

    let assignee = Capabilities::member(4);
    instance.advance(Some(2), &assignee).unwrap();
    assert_eq!(instance.current().unwrap().name, "File");
}
