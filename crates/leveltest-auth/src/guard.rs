//! Destination gating by identity and role.
//!
//! The policy is deliberate: an authenticated learner whose role does not
//! match the requirement is redirected to their own role's dashboard, never
//! to the requested page and never to a generic "forbidden" response.

use std::sync::Arc;

use leveltest_core::model::{Identity, Role};

use crate::context::SessionContext;

/// Where unauthenticated learners are sent.
pub const LOGIN_PATH: &str = "/login";
/// The student default destination.
pub const STUDENT_HOME: &str = "/dashboard";
/// The teacher default destination.
pub const TEACHER_HOME: &str = "/teacher-dashboard";

/// The guard's verdict for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Allow,
    RedirectTo(String),
}

/// The default destination for a role.
pub fn home_path(role: Role) -> &'static str {
    match role {
        Role::Student => STUDENT_HOME,
        Role::Teacher => TEACHER_HOME,
    }
}

/// Decide whether `identity` may enter `destination`.
pub fn can_enter(
    destination: &str,
    identity: Option<&Identity>,
    required_role: Option<Role>,
) -> RouteAccess {
    let Some(identity) = identity else {
        tracing::debug!(destination, "unauthenticated, redirecting to login");
        return RouteAccess::RedirectTo(LOGIN_PATH.to_string());
    };

    match required_role {
        Some(required) if identity.role != required => {
            tracing::debug!(
                destination,
                role = %identity.role,
                required = %required,
                "role mismatch, redirecting to own dashboard"
            );
            RouteAccess::RedirectTo(home_path(identity.role).to_string())
        }
        _ => RouteAccess::Allow,
    }
}

/// Convenience wrapper reading the identity from a shared context.
pub struct RouteGuard {
    context: Arc<SessionContext>,
}

impl RouteGuard {
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self { context }
    }

    pub fn check(&self, destination: &str, required_role: Option<Role>) -> RouteAccess {
        let snapshot = self.context.snapshot();
        can_enter(destination, snapshot.as_ref(), required_role)
    }
}
