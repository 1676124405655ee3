//! Configuration loading and representation.
//!
//! | Variable                 | Meaning                                              |
//! |--------------------------|------------------------------------------------------|
//! | `TOLLGATE_ROLE_DEFAULTS` | JSON `{ "MANAGER": [ {permission, resource}, ... ] }` |
//!
//! Missing variables give the deny-by-default policy.

use std::collections::BTreeMap;

use anyhow::Context;
use thiserror::Error;

use tollgate_authz::{PermissionAssignmentRow, Role, RoleDefaults, build_from_assignments};

pub const ROLE_DEFAULTS_VAR: &str = "TOLLGATE_ROLE_DEFAULTS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not valid JSON")]
    InvalidJson {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown role '{0}' in role defaults")]
    UnknownRole(String),
    #[error("defaults for privileged role {0} are fixed and cannot be configured")]
    AdminDefaultsNotConfigurable(Role),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthzConfig {
    pub role_defaults: RoleDefaults,
}

impl AuthzConfig {
    /// Load from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
            .context("failed to load authorization config from environment")
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let role_defaults = match lookup(ROLE_DEFAULTS_VAR) {
            Some(raw) if !raw.trim().is_empty() => parse_role_defaults(&raw)?,
            _ => RoleDefaults::builtin(),
        };
        Ok(Self { role_defaults })
    }
}

fn parse_role_defaults(raw: &str) -> Result<RoleDefaults, ConfigError> {
    let parsed: BTreeMap<String, Vec<PermissionAssignmentRow>> = serde_json::from_str(raw)
        .map_err(|source| ConfigError::InvalidJson {
            var: ROLE_DEFAULTS_VAR,
            source,
        })?;

    let mut defaults = RoleDefaults::builtin();
    for (name, rows) in parsed {
        let role = Role::parse(&name).ok_or_else(|| ConfigError::UnknownRole(name.clone()))?;
        if role.is_privileged() {
            return Err(ConfigError::AdminDefaultsNotConfigurable(role));
        }
        let built = build_from_assignments(&rows);
        if built.dropped > 0 {
            tracing::warn!(%role, dropped = built.dropped, "ignored malformed default rows");
        }
        defaults.set(role, built.matrix);
    }
    Ok(defaults)
}
