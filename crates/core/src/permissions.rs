//! Permission capability model for workflow operations.
//!
//! Every operation that needs authorization receives an explicit
//! [`Capabilities`] value instead of consulting ambient state. The API layer
//! builds one from the authenticated user's JWT claims; tests build them
//! directly.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Role names stored in JWT claims and the `users` table.
pub mod roles {
    /// Full access to the organization, including workflow administration.
    pub const ROLE_ADMIN: &str = "admin";
    /// Practice manager: edits all tasks, approves workflow steps.
    pub const ROLE_MANAGER: &str = "manager";
    /// Regular staff member: works on assigned tasks only.
    pub const ROLE_STAFF: &str = "staff";
}

/// What the acting user is allowed to do, resolved once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// The acting user's internal database id.
    pub user_id: DbId,
    /// Organization administrators bypass per-task checks.
    pub is_org_admin: bool,
    /// Blanket permission to edit any task (and so advance any workflow).
    pub can_edit_all_tasks: bool,
    /// Permission to record approvals on approval-gated steps.
    pub can_approve_tasks: bool,
}

impl Capabilities {
    /// Capabilities of a regular staff member: nothing beyond working on
    /// tasks assigned to them.
    pub fn member(user_id: DbId) -> Self {
        Self {
            user_id,
            is_org_admin: false,
            can_edit_all_tasks: false,
            can_approve_tasks: false,
        }
    }

    /// Capabilities of an organization admin.
    pub fn org_admin(user_id: DbId) -> Self {
        Self {
            user_id,
            is_org_admin: true,
            can_edit_all_tasks: true,
            can_approve_tasks: true,
        }
    }

    /// True when the user may mutate task state regardless of assignment.
    pub fn can_edit_any_task(&self) -> bool {
        self.is_org_admin || self.can_edit_all_tasks
    }

    /// True when the user may record step approvals.
    pub fn can_approve(&self) -> bool {
        self.is_org_admin || self.can_approve_tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_has_no_blanket_permissions() {
        let caps = Capabilities::member(7);
        assert_eq!(caps.user_id, 7);
        assert!(!caps.can_edit_any_task());
        assert!(!caps.can_approve());
    }

    #[test]
    fn org_admin_has_all_permissions() {
        let caps = Capabilities::org_admin(1);
        assert!(caps.can_edit_any_task());
        assert!(caps.can_approve());
    }

    #[test]
    fn approver_without_edit_rights() {
        let caps = Capabilities {
            user_id: 3,
            is_org_admin: false,
            can_edit_all_tasks: false,
            can_approve_tasks: true,
        };
        assert!(caps.can_approve());
        assert!(!caps.can_edit_any_task());
    }
}
