//! Permission service: store + resolver, plus the admin edit flows.

use serde::Serialize;

use tollgate_authz::{
    AuthzError, CrudAction, Feature, PermissionAssignmentRow, PermissionMatrix, Principal,
    Resolution, ResolutionSource, Role, RoleDefaults, UserAssignments, authorize,
    matrix_to_rows, resolve_role, resolve_session_role,
};
use tollgate_core::{ExpectedVersion, UserId};

use crate::config::AuthzConfig;
use crate::store::{AssignmentScope, PermissionStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Forbidden(#[from] AuthzError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("non-privileged editors cannot change their own {0} assignments")]
    SelfEdit(AssignmentScope),
    #[error("cannot grant '{feature}.{action}' without holding it")]
    Escalation { feature: Feature, action: CrudAction },
}

/// A role's current matrix as shown in the permissions editor.
#[derive(Debug, Clone, Serialize)]
pub struct RoleMatrixView {
    pub role: Role,
    pub label: &'static str,
    pub matrix: PermissionMatrix,
    pub source: ResolutionSource,
    /// Version to send back as the expected version when saving.
    pub version: u64,
}

pub struct PermissionService<S> {
    store: S,
    defaults: RoleDefaults,
}

impl<S> PermissionService<S>
where
    S: PermissionStore,
{
    pub fn new(store: S, defaults: RoleDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn from_config(store: S, config: &AuthzConfig) -> Self {
        Self::new(store, config.role_defaults.clone())
    }

    fn rows(&self, scope: AssignmentScope) -> Result<(Vec<PermissionAssignmentRow>, u64), StoreError> {
        Ok(self
            .store
            .load(scope)?
            .map(|set| (set.rows, set.version))
            .unwrap_or_default())
    }

    /// Resolve the caller's effective permissions.
    ///
    /// Privileged principals never touch the store.
    pub fn resolve(&self, principal: &Principal) -> Result<Resolution, ServiceError> {
        let role = match principal.role {
            Some(role) if !role.is_privileged() => role,
            other => return Ok(resolve_session_role(other, UserAssignments::Legacy(&[]))),
        };

        // One store call so both sets come from the same generation.
        let mut sets = self
            .store
            .load_many(&[AssignmentScope::User(principal.user_id), AssignmentScope::Role(role)])?
            .into_iter()
            .map(|set| set.map(|s| s.rows).unwrap_or_default());
        let user_rows = sets.next().unwrap_or_default();
        let role_rows = sets.next().unwrap_or_default();

        let resolution = resolve_session_role(
            Some(role),
            UserAssignments::Scoped {
                user: Some(user_rows.as_slice()),
                role: Some(role_rows.as_slice()),
            },
        );
        tracing::debug!(
            user_id = %principal.user_id,
            %role,
            source = ?resolution.source,
            "resolved permissions"
        );
        Ok(resolution)
    }

    pub fn effective_matrix(&self, principal: &Principal) -> Result<PermissionMatrix, ServiceError> {
        Ok(self.resolve(principal)?.matrix)
    }

    pub fn has_permission(
        &self,
        principal: &Principal,
        feature: Feature,
        action: CrudAction,
    ) -> Result<bool, ServiceError> {
        Ok(self.effective_matrix(principal)?.allows(feature, action))
    }

    /// Check that `actor` may edit permissions; returns the actor's matrix.
    fn require(&self, actor: &Principal, action: CrudAction) -> Result<PermissionMatrix, ServiceError> {
        let matrix = self.effective_matrix(actor)?;
        authorize(&matrix, Feature::Permissions, action).map_err(|e| {
            tracing::warn!(actor = %actor.user_id, error = %e, "permission edit denied");
            ServiceError::from(e)
        })?;
        Ok(matrix)
    }

    /// Non-privileged editors may not touch their own role or user rows.
    fn ensure_not_own_scope(actor: &Principal, scope: AssignmentScope) -> Result<(), ServiceError> {
        if actor.is_privileged() {
            return Ok(());
        }
        let own = match scope {
            AssignmentScope::User(user_id) => user_id == actor.user_id,
            AssignmentScope::Role(role) => actor.role == Some(role),
        };
        if own {
            tracing::warn!(actor = %actor.user_id, %scope, "rejected edit of own permissions");
            return Err(ServiceError::SelfEdit(scope));
        }
        Ok(())
    }

    pub fn role_matrix(&self, role: Role) -> Result<RoleMatrixView, ServiceError> {
        let (rows, version) = if role.is_privileged() {
            (Vec::new(), 0)
        } else {
            self.rows(AssignmentScope::Role(role))?
        };
        let resolution = resolve_role(role, Some(rows.as_slice()));
        Ok(RoleMatrixView {
            role,
            label: role.label(),
            matrix: resolution.matrix,
            source: resolution.source,
            version,
        })
    }

    /// Every role an administrator may edit, in role order.
    pub fn editable_roles_overview(&self) -> Result<Vec<RoleMatrixView>, ServiceError> {
        Role::editable().map(|role| self.role_matrix(role)).collect()
    }

    fn write(
        &self,
        actor: &Principal,
        scope: AssignmentScope,
        matrix: &PermissionMatrix,
        expected: ExpectedVersion,
    ) -> Result<u64, ServiceError> {
        let actor_matrix = self.require(actor, CrudAction::Update)?;
        Self::ensure_not_own_scope(actor, scope)?;

        // Non-privileged editors can only hand out cells they hold themselves.
        if !actor.is_privileged() {
            if let Some((feature, action)) = matrix
                .granted_cells()
                .find(|&(feature, action)| !actor_matrix.allows(feature, action))
            {
                tracing::warn!(actor = %actor.user_id, %scope, %feature, %action, "rejected permission escalation");
                return Err(ServiceError::Escalation { feature, action });
            }
        }

        let rows = matrix_to_rows(matrix);
        let count = rows.len();
        let version = self.store.replace(scope, rows, expected)?;
        tracing::info!(actor = %actor.user_id, %scope, rows = count, version, "replaced permission assignments");
        Ok(version)
    }

    /// Replace a role's row set with the flattened `matrix`.
    pub fn save_role_matrix(
        &self,
        actor: &Principal,
        role: Role,
        matrix: &PermissionMatrix,
        expected: ExpectedVersion,
    ) -> Result<u64, ServiceError> {
        self.write(actor, AssignmentScope::Role(role), matrix, expected)
    }

    /// Replace a user's override rows with the flattened `matrix`.
    pub fn save_user_matrix(
        &self,
        actor: &Principal,
        user_id: UserId,
        matrix: &PermissionMatrix,
        expected: ExpectedVersion,
    ) -> Result<u64, ServiceError> {
        self.write(actor, AssignmentScope::User(user_id), matrix, expected)
    }

    /// Drop a user's overrides so the role's rows apply again.
    pub fn clear_user_overrides(&self, actor: &Principal, user_id: UserId) -> Result<bool, ServiceError> {
        self.require(actor, CrudAction::Update)?;
        let scope = AssignmentScope::User(user_id);
        Self::ensure_not_own_scope(actor, scope)?;
        let removed = self.store.remove(scope, ExpectedVersion::Any)?;
        tracing::info!(actor = %actor.user_id, %user_id, removed, "cleared user permission overrides");
        Ok(removed)
    }

    /// Overwrite a role's rows with its configured default.
    pub fn reset_role_to_defaults(
        &self,
        actor: &Principal,
        role: Role,
        expected: ExpectedVersion,
    ) -> Result<u64, ServiceError> {
        let defaults = self.defaults.matrix_for(role);
        self.save_role_matrix(actor, role, &defaults, expected)
    }
}
