//! Feature Catalog: the fixed set of manageable features and the CRUD actions
//! that are meaningful for each of them.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::action::CrudAction;
use crate::error::ParseError;

use CrudAction::{Create, Delete, Read, Update};

/// A manageable feature of the admin console.
///
/// Variants are declared in catalog order; `Feature as usize` is the row index
/// inside a [`PermissionMatrix`](crate::PermissionMatrix).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Software,
    Versions,
    Tokens,
    AuditLogs,
    Settings,
    Users,
    Permissions,
    Reports,
    Notifications,
    Backups,
    ApiKeys,
    Webhooks,
    Documents,
}

/// Static description of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureDefinition {
    pub key: Feature,
    pub label: &'static str,
    pub description: &'static str,
    /// Actions that may ever be granted on this feature.
    pub actions: &'static [CrudAction],
}

const ALL_ACTIONS: &[CrudAction] = &[Create, Read, Update, Delete];

/// The catalog, in display order.
pub const FEATURES: &[FeatureDefinition] = &[
    FeatureDefinition {
        key: Feature::Software,
        label: "Software",
        description: "Software catalog entries",
        actions: ALL_ACTIONS,
    },
    FeatureDefinition {
        key: Feature::Versions,
        label: "Versions",
        description: "Release versions of catalog software",
        actions: ALL_ACTIONS,
    },
    FeatureDefinition {
        key: Feature::Tokens,
        label: "Tokens",
        description: "License and access tokens",
        actions: ALL_ACTIONS,
    },
    FeatureDefinition {
        key: Feature::AuditLogs,
        label: "Audit logs",
        description: "Recorded administrative activity",
        actions: &[Read, Delete],
    },
    FeatureDefinition {
        key: Feature::Settings,
        label: "Settings",
        description: "System-wide settings",
        actions: &[Read, Update],
    },
    FeatureDefinition {
        key: Feature::Users,
        label: "Users",
        description: "Console user accounts",
        actions: ALL_ACTIONS,
    },
    FeatureDefinition {
        key: Feature::Permissions,
        label: "Permissions",
        description: "Role and user permission assignments",
        actions: &[Read, Update],
    },
    FeatureDefinition {
        key: Feature::Reports,
        label: "Reports",
        description: "Usage and license reports",
        actions: &[Create, Read, Delete],
    },
    FeatureDefinition {
        key: Feature::Notifications,
        label: "Notifications",
        description: "System notifications",
        actions: &[Read, Update, Delete],
    },
    FeatureDefinition {
        key: Feature::Backups,
        label: "Backups",
        description: "Database backups",
        actions: &[Create, Read, Delete],
    },
    FeatureDefinition {
        key: Feature::ApiKeys,
        label: "API keys",
        description: "Keys for programmatic access",
        actions: ALL_ACTIONS,
    },
    FeatureDefinition {
        key: Feature::Webhooks,
        label: "Webhooks",
        description: "Outbound event webhooks",
        actions: ALL_ACTIONS,
    },
    FeatureDefinition {
        key: Feature::Documents,
        label: "Documents",
        description: "Uploaded documents and attachments",
        actions: ALL_ACTIONS,
    },
];

/// Number of catalog features.
pub const FEATURE_COUNT: usize = 13;

const _: () = assert!(FEATURES.len() == FEATURE_COUNT);

impl Feature {
    /// All features in catalog order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Software,
        Feature::Versions,
        Feature::Tokens,
        Feature::AuditLogs,
        Feature::Settings,
        Feature::Users,
        Feature::Permissions,
        Feature::Reports,
        Feature::Notifications,
        Feature::Backups,
        Feature::ApiKeys,
        Feature::Webhooks,
        Feature::Documents,
    ];

    /// Storage and wire key (e.g. `auditLogs`).
    pub const fn key(self) -> &'static str {
        match self {
            Feature::Software => "software",
            Feature::Versions => "versions",
            Feature::Tokens => "tokens",
            Feature::AuditLogs => "auditLogs",
            Feature::Settings => "settings",
            Feature::Users => "users",
            Feature::Permissions => "permissions",
            Feature::Reports => "reports",
            Feature::Notifications => "notifications",
            Feature::Backups => "backups",
            Feature::ApiKeys => "apiKeys",
            Feature::Webhooks => "webhooks",
            Feature::Documents => "documents",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn definition(self) -> &'static FeatureDefinition {
        &FEATURES[self.index()]
    }

    pub fn valid_actions(self) -> &'static [CrudAction] {
        self.definition().actions
    }

    pub fn supports(self, action: CrudAction) -> bool {
        self.valid_actions().contains(&action)
    }

    /// Lenient lookup by storage key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl core::fmt::Display for Feature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Feature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| ParseError::UnknownFeature(s.to_string()))
    }
}

/// Membership test for persisted `resource` values.
pub fn is_valid_feature(key: &str) -> bool {
    Feature::from_key(key).is_some()
}
