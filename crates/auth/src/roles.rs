//! Roles and the Role Default Policy.

use std::collections::BTreeMap;

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::matrix::PermissionMatrix;

/// Console role carried by the session.
///
/// `Admin` is privileged: it always resolves to full control and is never
/// offered for editing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::User];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::User => "USER",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::User => "User",
        }
    }

    pub const fn is_privileged(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Roles whose permissions an administrator may edit.
    pub fn editable() -> impl Iterator<Item = Role> {
        Self::ALL.into_iter().filter(|r| !r.is_privileged())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseError::UnknownRole(s.to_string()))
    }
}

/// Default matrices for the non-privileged roles.
///
/// The built-in policy is deny-by-default: every non-admin role starts with
/// nothing. Deployments may configure other defaults; the admin default is
/// always derived and cannot be configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDefaults {
    configured: BTreeMap<Role, PermissionMatrix>,
}

impl RoleDefaults {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Configure the default for a non-privileged role. Returns `false` (and
    /// changes nothing) for a privileged role.
    pub fn set(&mut self, role: Role, matrix: PermissionMatrix) -> bool {
        if role.is_privileged() {
            return false;
        }
        self.configured.insert(role, matrix);
        true
    }

    /// A fresh default matrix for `role`; mutating it never affects the policy.
    pub fn matrix_for(&self, role: Role) -> PermissionMatrix {
        if role.is_privileged() {
            return PermissionMatrix::full_control();
        }
        self.configured.get(&role).cloned().unwrap_or_default()
    }

    /// Like [`matrix_for`](Self::matrix_for) for a raw session role.
    /// Unrecognised roles get the empty matrix, never full control.
    pub fn matrix_for_name(&self, role: &str) -> PermissionMatrix {
        match Role::parse(role) {
            Some(role) => self.matrix_for(role),
            None => {
                tracing::debug!(role, "unknown role; using empty default");
                PermissionMatrix::empty()
            }
        }
    }
}

/// Built-in default matrix for `role`.
pub fn get_role_default_matrix(role: Role) -> PermissionMatrix {
    RoleDefaults::builtin().matrix_for(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CrudAction, Feature};

    #[test]
    fn admin_default_is_full_control_over_valid_cells_only() {
        let m = get_role_default_matrix(Role::Admin);
        for feature in Feature::ALL {
            for action in CrudAction::ALL {
                assert_eq!(m.allows(feature, action), feature.supports(action), "{feature}.{action}");
            }
        }
    }

    #[test]
    fn non_admin_defaults_deny_everything() {
        assert!(get_role_default_matrix(Role::Manager).is_empty());
        assert!(get_role_default_matrix(Role::User).is_empty());
    }

    #[test]
    fn unknown_role_fails_closed() {
        let defaults = RoleDefaults::builtin();
        assert!(defaults.matrix_for_name("SUPERUSER").is_empty());
        assert!(defaults.matrix_for_name("admin").is_empty());
        assert_eq!(defaults.matrix_for_name("ADMIN"), PermissionMatrix::full_control());
    }

    #[test]
    fn returned_default_cannot_corrupt_policy() {
        let mut defaults = RoleDefaults::builtin();
        let mut manager = PermissionMatrix::empty();
        manager.grant(Feature::Software, CrudAction::Read);
        assert!(defaults.set(Role::Manager, manager.clone()));

        let mut handed_out = defaults.matrix_for(Role::Manager);
        handed_out.grant(Feature::Users, CrudAction::Delete);
        assert_eq!(defaults.matrix_for(Role::Manager), manager);

        let mut admin = defaults.matrix_for(Role::Admin);
        admin.revoke_all(Feature::Software);
        assert_eq!(defaults.matrix_for(Role::Admin), PermissionMatrix::full_control());
    }

    #[test]
    fn admin_default_is_not_configurable() {
        let mut defaults = RoleDefaults::builtin();
        assert!(!defaults.set(Role::Admin, PermissionMatrix::empty()));
        assert_eq!(defaults.matrix_for(Role::Admin), PermissionMatrix::full_control());
    }

    #[test]
    fn editable_roles_exclude_admin() {
        let editable: Vec<_> = Role::editable().collect();
        assert_eq!(editable, vec![Role::Manager, Role::User]);
    }
}
