//! Route definitions for task approval records.

use axum::routing::get;
use axum::Router;

use crate::handlers::approvals;
use crate::state::AppState;

/// Approval routes, mounted at `/task-approvals`.
///
/// ```text
/// GET    /?task={id}              list_approvals
/// POST   /                        create_approval
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(approvals::list_approvals).post(approvals::create_approval),
    )
}
