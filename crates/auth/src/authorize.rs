//! Admin policy check for management endpoints.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Administration rights required")]
    AdminRequired,
}

/// Gate an operation behind the admin claim.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn require_admin(is_admin: bool) -> Result<(), AuthzError> {
    if is_admin {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes() {
        assert_eq!(require_admin(true), Ok(()));
    }

    #[test]
    fn non_admin_is_denied_with_the_canonical_message() {
        let err = require_admin(false).unwrap_err();
        assert_eq!(err.to_string(), "Administration rights required");
    }
}
