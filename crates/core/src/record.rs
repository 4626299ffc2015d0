//! Catalog record model and moderation DTOs.
//!
//! A [`Record`] is either a category or a service. The moderation store
//! only interprets the activity, deletion and moderation fields; every
//! other field is carried through untouched in [`Record::payload`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Payload, RecordId, Timestamp};

// ---------------------------------------------------------------------------
// CatalogKind
// ---------------------------------------------------------------------------

/// Which catalog resource a store or client instance manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Category,
    Service,
}

impl CatalogKind {
    /// REST resource segment, e.g. `categories`.
    pub fn resource(self) -> &'static str {
        match self {
            CatalogKind::Category => "categories",
            CatalogKind::Service => "services",
        }
    }

    /// Singular entity name used in error messages and log fields.
    pub fn entity_name(self) -> &'static str {
        match self {
            CatalogKind::Category => "category",
            CatalogKind::Service => "service",
        }
    }
}

// ---------------------------------------------------------------------------
// ModerationStatus
// ---------------------------------------------------------------------------

/// Editorial classification, independent of active/inactive/deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Flagged,
    Hidden,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
            ModerationStatus::Flagged => "flagged",
            ModerationStatus::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            "flagged" => Ok(ModerationStatus::Flagged),
            "hidden" => Ok(ModerationStatus::Hidden),
            other => Err(CoreError::Validation(format!(
                "Invalid moderation status '{other}'. Must be one of: {}",
                crate::moderation::VALID_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// UserRef
// ---------------------------------------------------------------------------

/// Reference to the user that performed a deletion.
///
/// The API returns either a bare user id or a populated user object,
/// depending on whether the relation was expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "UserRefWire")]
pub enum UserRef {
    Id(String),
    User {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// Incoming form of [`UserRef`]. Populated users may carry `_id`, `id`
/// or both.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserRefWire {
    Id(String),
    User {
        #[serde(rename = "_id", default)]
        object_id: Option<String>,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl TryFrom<UserRefWire> for UserRef {
    type Error = CoreError;

    fn try_from(wire: UserRefWire) -> Result<Self, Self::Error> {
        match wire {
            UserRefWire::Id(id) => Ok(UserRef::Id(id)),
            UserRefWire::User {
                object_id,
                id,
                name,
                email,
            } => Ok(UserRef::User {
                id: resolve_id(object_id, id, "user")?,
                name,
                email,
            }),
        }
    }
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::User { id, .. } => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A category or service as returned by the catalog API.
///
/// Serialized with `id`; deserialized from `id`, `_id` or both (document
/// stores with an `id` virtual send both). When both are present `id`
/// wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RecordWire")]
pub struct Record {
    pub id: RecordId,
    pub is_active: bool,
    pub is_deleted: bool,
    pub moderation_status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<UserRef>,
    /// Fields the store does not interpret.
    #[serde(flatten)]
    pub payload: Payload,
}

/// Incoming form of [`Record`], keeping both id spellings apart.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    #[serde(rename = "_id", default)]
    object_id: Option<RecordId>,
    #[serde(default)]
    id: Option<RecordId>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    moderation_status: ModerationStatus,
    #[serde(default)]
    moderation_notes: Option<String>,
    #[serde(default)]
    deleted_at: Option<Timestamp>,
    #[serde(default)]
    deleted_by: Option<UserRef>,
    #[serde(flatten)]
    payload: Payload,
}

fn default_active() -> bool {
    true
}

fn resolve_id(
    object_id: Option<String>,
    id: Option<String>,
    entity: &str,
) -> Result<String, CoreError> {
    id.or(object_id)
        .ok_or_else(|| CoreError::Validation(format!("{entity} has neither `id` nor `_id`")))
}

impl TryFrom<RecordWire> for Record {
    type Error = CoreError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: resolve_id(wire.object_id, wire.id, "record")?,
            is_active: wire.is_active,
            is_deleted: wire.is_deleted,
            moderation_status: wire.moderation_status,
            moderation_notes: wire.moderation_notes,
            deleted_at: wire.deleted_at,
            deleted_by: wire.deleted_by,
            payload: wire.payload,
        })
    }
}

impl Record {
    /// A fresh, active, non-deleted, pending record with an empty payload.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            is_active: true,
            is_deleted: false,
            moderation_status: ModerationStatus::Pending,
            moderation_notes: None,
            deleted_at: None,
            deleted_by: None,
            payload: Payload::new(),
        }
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    pub fn with_status(mut self, status: ModerationStatus) -> Self {
        self.moderation_status = status;
        self
    }

    /// Set an opaque payload field.
    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Display name from the payload, when present.
    pub fn name(&self) -> Option<&str> {
        self.payload.get("name").and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// ModerationRequest
// ---------------------------------------------------------------------------

/// Body of a moderation call: the new status plus optional reviewer notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    pub status: ModerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ModerationRequest {
    pub fn new(status: ModerationStatus, notes: Option<String>) -> Self {
        Self { status, notes }
    }

    pub fn approve(notes: Option<String>) -> Self {
        Self::new(ModerationStatus::Approved, notes)
    }

    pub fn reject(notes: Option<String>) -> Self {
        Self::new(ModerationStatus::Rejected, notes)
    }
}
