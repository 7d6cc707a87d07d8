//! Cache invalidation signals.
//!
//! The event service publishes an [`EventDeleted`] whenever a delete actually
//! removed a document. Cache layers subscribe and drop whatever they hold for
//! the event or the route it was rendered under.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the broadcast buffer; slow subscribers lag past this
const DEFAULT_CAPACITY: usize = 64;

/// An event was removed from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDeleted {
    /// Hex id of the removed event
    pub event_id: String,
    /// Route the caller asked to revalidate
    pub path: Option<String>,
}

/// Fan-out channel for invalidation signals
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    tx: broadcast::Sender<EventDeleted>,
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventDeleted> {
        self.tx.subscribe()
    }

    /// Publish a signal, returning how many subscribers received it.
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, signal: EventDeleted) -> usize {
        match self.tx.send(signal) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(signal)) => {
                debug!(event_id = %signal.event_id, "No invalidation subscribers");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
