use roost_core::UserId;

/// Authenticated identity for a request, derived from verified token claims.
///
/// This is immutable and must be present for all entity routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    username: String,
    is_admin: bool,
}

impl AuthContext {
    pub fn new(user_id: UserId, username: String, is_admin: bool) -> Self {
        Self {
            user_id,
            username,
            is_admin,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}
