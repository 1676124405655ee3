//! The four CRUD actions exposed to the admin UI.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One of the four CRUD actions. Closed enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrudAction {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudAction {
    /// All actions in enum order. Matrix rows and flattened assignment lists
    /// follow this order.
    pub const ALL: [CrudAction; 4] = [
        CrudAction::Create,
        CrudAction::Read,
        CrudAction::Update,
        CrudAction::Delete,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CrudAction::Create => "CREATE",
            CrudAction::Read => "READ",
            CrudAction::Update => "UPDATE",
            CrudAction::Delete => "DELETE",
        }
    }

    /// Position of this action inside a matrix row.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Lenient parse: `None` for anything outside the vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl core::fmt::Display for CrudAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrudAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseError::UnknownAction(s.to_string()))
    }
}
