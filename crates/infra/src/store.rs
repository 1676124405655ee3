//! Assignment-row storage.
//!
//! A role or a user owns one row set. Writes replace the whole set; the
//! in-memory store does delete-then-recreate under a single write lock and
//! checks an optimistic version so concurrent editors cannot silently
//! overwrite each other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use tollgate_authz::{PermissionAssignmentRow, Role};
use tollgate_core::{DomainError, ExpectedVersion, UserId};

/// Owner of a row set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AssignmentScope {
    Role(Role),
    User(UserId),
}

impl core::fmt::Display for AssignmentScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AssignmentScope::Role(role) => write!(f, "role:{role}"),
            AssignmentScope::User(user_id) => write!(f, "user:{user_id}"),
        }
    }
}

/// A stored row set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentSet {
    pub rows: Vec<PermissionAssignmentRow>,
    /// Starts at 1 on first write; 0 is "never written".
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("assignments of privileged role {0} cannot be edited")]
    ProtectedRole(Role),
    #[error("concurrent modification of {scope}")]
    Conflict {
        scope: AssignmentScope,
        #[source]
        source: DomainError,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

/// Persistence collaborator for assignment rows.
pub trait PermissionStore: Send + Sync {
    /// The row set of `scope`, or `None` if it was never written.
    fn load(&self, scope: AssignmentScope) -> Result<Option<AssignmentSet>, StoreError>;

    /// Load several row sets from one consistent snapshot, in `scopes` order.
    fn load_many(&self, scopes: &[AssignmentScope]) -> Result<Vec<Option<AssignmentSet>>, StoreError>;

    /// Replace the full row set of `scope` atomically. Returns the new
    /// version.
    fn replace(
        &self,
        scope: AssignmentScope,
        rows: Vec<PermissionAssignmentRow>,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;

    /// Drop the row set of `scope`. Returns whether anything was removed.
    fn remove(&self, scope: AssignmentScope, expected: ExpectedVersion) -> Result<bool, StoreError>;
}

impl<S> PermissionStore for Arc<S>
where
    S: PermissionStore + ?Sized,
{
    fn load(&self, scope: AssignmentScope) -> Result<Option<AssignmentSet>, StoreError> {
        (**self).load(scope)
    }

    fn load_many(&self, scopes: &[AssignmentScope]) -> Result<Vec<Option<AssignmentSet>>, StoreError> {
        (**self).load_many(scopes)
    }

    fn replace(
        &self,
        scope: AssignmentScope,
        rows: Vec<PermissionAssignmentRow>,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        (**self).replace(scope, rows, expected)
    }

    fn remove(&self, scope: AssignmentScope, expected: ExpectedVersion) -> Result<bool, StoreError> {
        (**self).remove(scope, expected)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    sets: RwLock<HashMap<AssignmentScope, AssignmentSet>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Storage("assignment store lock poisoned".to_string())
}

fn ensure_editable(scope: AssignmentScope) -> Result<(), StoreError> {
    match scope {
        AssignmentScope::Role(role) if role.is_privileged() => Err(StoreError::ProtectedRole(role)),
        _ => Ok(()),
    }
}

fn check_version(
    scope: AssignmentScope,
    expected: ExpectedVersion,
    current: u64,
) -> Result<(), StoreError> {
    expected.check(current).map_err(|source| {
        tracing::warn!(%scope, ?expected, current, "rejected stale permission write");
        StoreError::Conflict { scope, source }
    })
}

impl PermissionStore for InMemoryPermissionStore {
    fn load(&self, scope: AssignmentScope) -> Result<Option<AssignmentSet>, StoreError> {
        let sets = self.sets.read().map_err(poisoned)?;
        Ok(sets.get(&scope).cloned())
    }

    fn load_many(&self, scopes: &[AssignmentScope]) -> Result<Vec<Option<AssignmentSet>>, StoreError> {
        let sets = self.sets.read().map_err(poisoned)?;
        Ok(scopes.iter().map(|scope| sets.get(scope).cloned()).collect())
    }

    fn replace(
        &self,
        scope: AssignmentScope,
        rows: Vec<PermissionAssignmentRow>,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        ensure_editable(scope)?;

        let mut sets = self.sets.write().map_err(poisoned)?;
        let current = sets.get(&scope).map_or(0, |s| s.version);
        check_version(scope, expected, current)?;

        let version = current + 1;
        sets.remove(&scope);
        sets.insert(
            scope,
            AssignmentSet {
                rows,
                version,
                updated_at: Utc::now(),
            },
        );
        Ok(version)
    }

    fn remove(&self, scope: AssignmentScope, expected: ExpectedVersion) -> Result<bool, StoreError> {
        ensure_editable(scope)?;

        let mut sets = self.sets.write().map_err(poisoned)?;
        let current = sets.get(&scope).map_or(0, |s| s.version);
        check_version(scope, expected, current)?;
        Ok(sets.remove(&scope).is_some())
    }
}
