//! `tollgate-authz`: permission authorization core for the Tollgate console.
//!
//! Pure and synchronous: no IO, no shared state. Storage hands in assignment
//! rows; this crate turns them into a [`PermissionMatrix`] and back.

pub mod action;
pub mod assignment;
pub mod authorize;
pub mod codec;
pub mod error;
pub mod feature;
pub mod matrix;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use action::CrudAction;
pub use assignment::{
    Assignment, BuiltMatrix, PermissionAssignmentRow, build_from_assignments,
    matrix_to_assignments, matrix_to_rows,
};
pub use authorize::{
    AuthorizationExplanation, AuthzError, DenialKind, DenialReason, RequiresPermission, authorize,
    authorize_command, explain_authorization,
};
pub use codec::{DbPermission, crud_to_db_permission, db_permission_to_crud};
pub use error::ParseError;
pub use feature::{FEATURE_COUNT, FEATURES, Feature, FeatureDefinition, is_valid_feature};
pub use matrix::{PermissionMatrix, has_permission_in_matrix};
pub use principal::Principal;
pub use resolver::{
    Resolution, ResolutionSource, UserAssignments, get_effective_permission_matrix,
    get_role_permission_matrix, resolve_role, resolve_session_role, resolve_user,
};
pub use roles::{Role, RoleDefaults, get_role_default_matrix};
