//! Well-known role name constants.
//!
//! These must match the role values issued by the monitoring API.

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_WORKER: &str = "WORKER";

/// Whether `role` grants access to admin-only operations.
pub fn is_admin_role(role: &str) -> bool {
    role.eq_ignore_ascii_case(ROLE_ADMIN)
}
