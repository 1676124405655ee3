//! DB-Permission Codec.
//!
//! The permission vocabulary persisted in storage predates the CRUD vocabulary
//! used everywhere else. This module is the only place that knows about it.
//!
//! | CrudAction | DB token   |
//! |------------|------------|
//! | CREATE     | `WRITE`    |
//! | READ       | `READ`     |
//! | UPDATE     | `SYNC`     |
//! | DELETE     | `EXCHANGE` |
//!
//! `EXTEND` also exists in storage (token permissions) but has no CRUD
//! counterpart and never decodes.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::action::CrudAction;
use crate::error::ParseError;

/// A permission token as persisted in storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DbPermission {
    Read,
    Write,
    Sync,
    Exchange,
    Extend,
}

impl DbPermission {
    pub const ALL: [DbPermission; 5] = [
        DbPermission::Read,
        DbPermission::Write,
        DbPermission::Sync,
        DbPermission::Exchange,
        DbPermission::Extend,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DbPermission::Read => "READ",
            DbPermission::Write => "WRITE",
            DbPermission::Sync => "SYNC",
            DbPermission::Exchange => "EXCHANGE",
            DbPermission::Extend => "EXTEND",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == token)
    }

    /// The CRUD action this token stands for, if any.
    pub const fn to_crud(self) -> Option<CrudAction> {
        match self {
            DbPermission::Write => Some(CrudAction::Create),
            DbPermission::Read => Some(CrudAction::Read),
            DbPermission::Sync => Some(CrudAction::Update),
            DbPermission::Exchange => Some(CrudAction::Delete),
            DbPermission::Extend => None,
        }
    }
}

impl core::fmt::Display for DbPermission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbPermission {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseError::UnknownToken(s.to_string()))
    }
}

impl From<CrudAction> for DbPermission {
    fn from(action: CrudAction) -> Self {
        crud_to_db_permission(action)
    }
}

pub const fn crud_to_db_permission(action: CrudAction) -> DbPermission {
    match action {
        CrudAction::Create => DbPermission::Write,
        CrudAction::Read => DbPermission::Read,
        CrudAction::Update => DbPermission::Sync,
        CrudAction::Delete => DbPermission::Exchange,
    }
}

/// Decode a stored token. `None` for unknown tokens and for `EXTEND`; callers
/// skip the row.
pub fn db_permission_to_crud(token: &str) -> Option<CrudAction> {
    DbPermission::parse(token).and_then(DbPermission::to_crud)
}
