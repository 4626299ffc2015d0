//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`StoreEventBus`] is owned by a single moderation store; subscribers
//! receive every [`StoreEvent`] the store publishes after they subscribe.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use bazaar_core::types::RecordId;
use bazaar_core::{ActionClass, CatalogKind, ViewKind};

// ---------------------------------------------------------------------------
// StoreEvent
// ---------------------------------------------------------------------------

/// What changed inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreChange {
    /// A fetch replaced a view wholesale.
    ViewReplaced { view: ViewKind, len: usize },
    /// A fetch failed; the view kept its previous contents.
    ViewFailed { view: ViewKind, message: String },
    /// Search results were replaced or cleared.
    SearchUpdated { query: String, len: usize },
    /// A confirmed action patched a record into the loaded views.
    RecordPatched { id: RecordId },
    /// A confirmed action removed a record from one or more views.
    RecordRemoved { id: RecordId, views: Vec<ViewKind> },
    /// An action class changed loading/success/error state.
    ActionChanged { class: ActionClass },
    /// A bulk operation settled.
    BulkSettled {
        class: ActionClass,
        total: usize,
        failed: usize,
    },
}

/// A change published by a moderation store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreEvent {
    /// Which catalog the publishing store manages.
    pub kind: CatalogKind,
    pub change: StoreChange,
    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl StoreEvent {
    pub fn new(kind: CatalogKind, change: StoreChange) -> Self {
        Self {
            kind,
            change,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use bazaar_core::{CatalogKind, ViewKind};
/// use bazaar_events::{StoreChange, StoreEvent, StoreEventBus};
///
/// let bus = StoreEventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(StoreEvent::new(
///     CatalogKind::Category,
///     StoreChange::ViewReplaced { view: ViewKind::All, len: 0 },
/// ));
/// ```
pub struct StoreEventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl StoreEventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`. A lagging UI should
    /// re-read the whole store rather than replay events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: StoreEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }
}

impl Default for StoreEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
