//! Client-side moderation state for Bazaar categories and services.
//!
//! [`ModerationStateStore`] caches catalog records in overlapping views
//! (all, active, inactive, deleted, search results) and keeps them
//! consistent as moderation actions are confirmed by the catalog API.
//!
//! One store is created per owning UI scope and shared as
//! `Arc<ModerationStateStore>`; there is no process-wide instance.

pub mod action;
pub mod bulk;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod selection;
pub mod store;
pub mod view;

pub use action::{ActionState, ActionStates};
pub use bulk::BulkOutcome;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use reconcile::Reconcile;
pub use selection::prune_selection;
pub use store::{ModerationStateStore, StoreState};
pub use view::{CollectionView, SearchResults, Views};
