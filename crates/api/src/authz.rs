//! API-side admin gate for entity endpoints.
//!
//! This enforces the policy at the request boundary (before any service
//! call), while keeping domain crates and the store auth-agnostic.

use roost_auth::AuthzError;

use crate::context::AuthContext;

/// Check the admin claim on the current request context.
///
/// This is intended to be called **before** touching the store. Every
/// entity handler gates on it; only `/health` and `/login` are open.
pub fn authorize_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    roost_auth::require_admin(auth.is_admin())
}
