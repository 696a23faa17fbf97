//! Store event types and the EventBus
//!
//! Every slot write publishes a [`StoreEvent`]; views subscribe and re-read
//! the collections they display. A committed import publishes a single
//! [`StoreEvent::StoreInvalidated`] instead of forcing a restart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::store::SlotKey;

/// Default channel capacity for a store's event bus
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Change notification published by the persisted store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// One slot's in-memory value was replaced
    SlotChanged {
        key: SlotKey,
        timestamp: DateTime<Utc>,
    },

    /// Several slots were replaced at once; re-read all of them
    StoreInvalidated {
        keys: Vec<SlotKey>,
        timestamp: DateTime<Utc>,
    },
}

impl StoreEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &str {
        match self {
            StoreEvent::SlotChanged { .. } => "SlotChanged",
            StoreEvent::StoreInvalidated { .. } => "StoreInvalidated",
        }
    }

    /// Whether a view showing `key` has to re-read it
    pub fn affects(&self, key: SlotKey) -> bool {
        match self {
            StoreEvent::SlotChanged { key: changed, .. } => *changed == key,
            StoreEvent::StoreInvalidated { keys, .. } => keys.contains(&key),
        }
    }
}

/// Event distribution bus for store changes
///
/// Uses `tokio::broadcast` internally:
/// - Non-blocking publish (slow subscribers don't block writers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use farmoptima_common::events::{EventBus, StoreEvent};
/// use farmoptima_common::store::SlotKey;
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(StoreEvent::SlotChanged {
///     key: SlotKey::Fields,
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert!(event.affects(SlotKey::Fields));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before
    /// the oldest are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Store writes use this: a store nobody watches still works.
    pub fn emit_lossy(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }
}
