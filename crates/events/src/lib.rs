//! Store change notifications.
//!
//! - [`StoreEventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StoreEvent`]: envelope describing one change to a moderation store.
//!
//! A UI layer subscribes once per store and re-renders the affected view
//! when an event arrives, instead of polling the store.

pub mod bus;

pub use bus::{StoreChange, StoreEvent, StoreEventBus};
