//! View and action-class identifiers plus the view membership rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A named, independently paginated collection held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    All,
    Active,
    Inactive,
    Deleted,
}

impl ViewKind {
    /// Every list view, in the order the store initializes them.
    pub const ALL_VIEWS: [ViewKind; 4] = [
        ViewKind::All,
        ViewKind::Active,
        ViewKind::Inactive,
        ViewKind::Deleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::All => "all",
            ViewKind::Active => "active",
            ViewKind::Inactive => "inactive",
            ViewKind::Deleted => "deleted",
        }
    }

    /// Whether a record belongs in this view.
    ///
    /// `active` and `inactive` partition the live records; deleted records
    /// belong to neither. `all` admits everything the API returns for it.
    pub fn admits(self, record: &Record) -> bool {
        match self {
            ViewKind::All => true,
            ViewKind::Active => record.is_active && !record.is_deleted,
            ViewKind::Inactive => !record.is_active && !record.is_deleted,
            ViewKind::Deleted => record.is_deleted,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class of mutating operation tracked by an `ActionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionClass {
    Create,
    Update,
    Delete,
    Moderate,
}

impl ActionClass {
    pub const ALL_CLASSES: [ActionClass; 4] = [
        ActionClass::Create,
        ActionClass::Update,
        ActionClass::Delete,
        ActionClass::Moderate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionClass::Create => "create",
            ActionClass::Update => "update",
            ActionClass::Delete => "delete",
            ActionClass::Moderate => "moderate",
        }
    }
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
