//! Effective Permission Resolver.
//!
//! Combines the Role Default Policy with persisted assignment rows. ADMIN
//! always short-circuits to full control; for every other role the matrix is
//! built from rows or is empty. There is no implicit grant.

use serde::Serialize;

use crate::assignment::{PermissionAssignmentRow, build_from_assignments};
use crate::matrix::PermissionMatrix;
use crate::roles::{Role, get_role_default_matrix};

/// Where a resolved matrix came from.
///
/// `ExplicitlyCleared` and `NotQueried` currently produce the same (empty)
/// matrix. They are kept apart so callers can tell "the rows were deleted"
/// from "nobody looked".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Privileged role; persisted rows were not consulted.
    Privileged,
    /// Built from user-level override rows.
    UserAssignments,
    /// Built from role-level rows.
    RoleAssignments,
    /// Rows were queried and none of them granted anything.
    ExplicitlyCleared,
    /// Legacy user list without any valid row.
    NoAssignments,
    /// No rows were supplied at all.
    NotQueried,
    /// The session role is not one we know; fail closed.
    UnknownRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub matrix: PermissionMatrix,
    pub source: ResolutionSource,
}

impl Resolution {
    fn empty(source: ResolutionSource) -> Self {
        Self {
            matrix: PermissionMatrix::empty(),
            source,
        }
    }

    fn privileged(role: Role) -> Self {
        tracing::trace!(%role, "privileged role; skipping persisted assignments");
        Self {
            matrix: get_role_default_matrix(role),
            source: ResolutionSource::Privileged,
        }
    }
}

/// Assignment rows available for a user-keyed resolution.
#[derive(Debug, Clone, Copy)]
pub enum UserAssignments<'a> {
    /// Pre-role-based data: one flat list with no cleared/not-queried
    /// distinction.
    Legacy(&'a [PermissionAssignmentRow]),
    /// User override rows, falling back to the role's rows. `None` means the
    /// corresponding set was not queried.
    Scoped {
        user: Option<&'a [PermissionAssignmentRow]>,
        role: Option<&'a [PermissionAssignmentRow]>,
    },
}

/// Resolve a role's matrix from its persisted rows.
///
/// `rows = Some(&[])` means "queried, nothing found"; `None` means no query
/// was made. Both yield the empty matrix for non-privileged roles.
pub fn resolve_role(role: Role, rows: Option<&[PermissionAssignmentRow]>) -> Resolution {
    if role.is_privileged() {
        return Resolution::privileged(role);
    }

    let Some(rows) = rows else {
        return Resolution::empty(ResolutionSource::NotQueried);
    };

    let built = build_from_assignments(rows);
    if built.has_valid_rows() {
        Resolution {
            matrix: built.matrix,
            source: ResolutionSource::RoleAssignments,
        }
    } else {
        Resolution::empty(ResolutionSource::ExplicitlyCleared)
    }
}

/// Resolve a user's matrix: user overrides first, then the role's rows.
pub fn resolve_user(role: Role, assignments: UserAssignments<'_>) -> Resolution {
    if role.is_privileged() {
        return Resolution::privileged(role);
    }

    match assignments {
        UserAssignments::Legacy(rows) => {
            let built = build_from_assignments(rows);
            if built.has_valid_rows() {
                Resolution {
                    matrix: built.matrix,
                    source: ResolutionSource::UserAssignments,
                }
            } else {
                Resolution::empty(ResolutionSource::NoAssignments)
            }
        }
        UserAssignments::Scoped { user, role: role_rows } => {
            if let Some(user_rows) = user {
                let built = build_from_assignments(user_rows);
                if built.has_valid_rows() {
                    return Resolution {
                        matrix: built.matrix,
                        source: ResolutionSource::UserAssignments,
                    };
                }
            }
            resolve_role(role, role_rows)
        }
    }
}

/// Resolve for a raw session role. Unknown roles resolve to the empty matrix.
pub fn resolve_session_role(role: Option<Role>, assignments: UserAssignments<'_>) -> Resolution {
    match role {
        Some(role) => resolve_user(role, assignments),
        None => Resolution::empty(ResolutionSource::UnknownRole),
    }
}

pub fn get_role_permission_matrix(
    role: Role,
    rows: Option<&[PermissionAssignmentRow]>,
) -> PermissionMatrix {
    resolve_role(role, rows).matrix
}

pub fn get_effective_permission_matrix(
    role: Role,
    assignments: UserAssignments<'_>,
) -> PermissionMatrix {
    resolve_user(role, assignments).matrix
}
