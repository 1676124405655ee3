//! The authenticated session principal.

use serde::{Deserialize, Serialize};

use tollgate_core::UserId;

use crate::roles::Role;

/// The authenticated caller, as handed over by the session layer.
///
/// `role` is `None` when the session carried a role string outside the known
/// vocabulary; such a principal resolves to the empty matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Option<Role>,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role: Some(role),
        }
    }

    /// Build from the opaque session pair `(userId, role)`.
    pub fn from_session(user_id: UserId, role: &str) -> Self {
        let parsed = Role::parse(role);
        if parsed.is_none() {
            tracing::warn!(%user_id, role, "session carries an unknown role");
        }
        Self {
            user_id,
            role: parsed,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_some_and(Role::is_privileged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_role_is_parsed() {
        let id = UserId::new();
        assert_eq!(Principal::from_session(id, "MANAGER").role, Some(Role::Manager));
        assert!(Principal::from_session(id, "ADMIN").is_privileged());
    }

    #[test]
    fn unknown_session_role_is_not_privileged() {
        let p = Principal::from_session(UserId::new(), "root");
        assert_eq!(p.role, None);
        assert!(!p.is_privileged());
    }
}
