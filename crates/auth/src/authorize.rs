use serde::Serialize;
use thiserror::Error;

use crate::action::CrudAction;
use crate::feature::Feature;
use crate::matrix::PermissionMatrix;
use crate::principal::Principal;
use crate::resolver::{Resolution, ResolutionSource};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{feature}.{action}'")]
    Forbidden { feature: Feature, action: CrudAction },
}

/// Command-side authorization contract.
///
/// Implement this on commands that require permissions; the request layer
/// checks them against the caller's matrix before dispatching.
pub trait RequiresPermission {
    fn required_permissions(&self) -> &[(Feature, CrudAction)];
}

/// Check a single cell.
///
/// - No IO
/// - No panics
pub fn authorize(
    matrix: &PermissionMatrix,
    feature: Feature,
    action: CrudAction,
) -> Result<(), AuthzError> {
    if matrix.allows(feature, action) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { feature, action })
    }
}

/// Check every permission a command requires; fails on the first missing one.
pub fn authorize_command<C: RequiresPermission + ?Sized>(
    matrix: &PermissionMatrix,
    command: &C,
) -> Result<(), AuthzError> {
    for &(feature, action) in command.required_permissions() {
        authorize(matrix, feature, action)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a request was allowed or denied.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub feature: Feature,
    pub action: CrudAction,
    pub granted: bool,
    pub reason: String,
    pub principal: Principal,
    pub source: ResolutionSource,
    /// Granted cells as `feature.ACTION`, catalog order.
    pub effective_permissions: Vec<String>,
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    UnknownRole,
    UnsupportedAction,
    MissingPermission,
}

/// Explain the decision `authorize` would make for this principal.
pub fn explain_authorization(
    principal: &Principal,
    resolution: &Resolution,
    feature: Feature,
    action: CrudAction,
) -> AuthorizationExplanation {
    let effective_permissions: Vec<String> = resolution
        .matrix
        .granted_cells()
        .map(|(f, a)| format!("{f}.{a}"))
        .collect();
    let granted = resolution.matrix.allows(feature, action);

    let (reason, denial_reason) = if granted {
        let reason = match resolution.source {
            ResolutionSource::Privileged => "Principal holds a privileged role with full control".to_string(),
            ResolutionSource::UserAssignments => {
                format!("User-level assignment grants '{feature}.{action}'")
            }
            _ => format!("Role assignment grants '{feature}.{action}'"),
        };
        (reason, None)
    } else if resolution.source == ResolutionSource::UnknownRole {
        (
            "Principal's session role is not recognised".to_string(),
            Some(DenialReason {
                kind: DenialKind::UnknownRole,
                message: "Unknown roles resolve to no permissions".to_string(),
                suggestions: vec!["Assign the user one of the known roles".to_string()],
            }),
        )
    } else if !feature.supports(action) {
        (
            format!("'{action}' is not an action of '{feature}'"),
            Some(DenialReason {
                kind: DenialKind::UnsupportedAction,
                message: format!(
                    "'{feature}' only supports {:?}",
                    feature.valid_actions()
                ),
                suggestions: Vec::new(),
            }),
        )
    } else {
        let mut suggestions = vec![format!(
            "Grant '{feature}.{action}' to the principal's role"
        )];
        if resolution.source == ResolutionSource::NotQueried {
            suggestions.insert(0, "No assignments were loaded for this principal".to_string());
        }
        (
            format!(
                "Principal does not have '{feature}.{action}'. Current permissions: {effective_permissions:?}"
            ),
            Some(DenialReason {
                kind: DenialKind::MissingPermission,
                message: format!("Missing required permission: '{feature}.{action}'"),
                suggestions,
            }),
        )
    };

    AuthorizationExplanation {
        feature,
        action,
        granted,
        reason,
        principal: principal.clone(),
        source: resolution.source,
        effective_permissions,
        denial_reason,
    }
}
