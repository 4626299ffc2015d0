//! Domain types shared by the Bazaar catalog client and moderation store.
//!
//! This crate has no internal dependencies so it can be used by both the
//! collaborator API client and the in-memory moderation store.

pub mod error;
pub mod moderation;
pub mod pagination;
pub mod record;
pub mod search;
pub mod types;
pub mod views;

pub use error::CoreError;
pub use pagination::{ListParams, Pagination};
pub use record::{CatalogKind, ModerationRequest, ModerationStatus, Record, UserRef};
pub use views::{ActionClass, ViewKind};
