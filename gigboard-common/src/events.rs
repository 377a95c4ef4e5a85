//! Event types for the Gigboard event system
//!
//! Wizard components emit events on the [`EventBus`]; the service forwards
//! them to connected browsers over SSE (warning toasts, step indicator,
//! post-publish navigation).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Listing wizard events
///
/// Steps are carried as their 1-based cursor value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WizardEvent {
    /// Draft written to durable storage
    DraftSaved {
        step: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Step cursor moved forward or backward
    StepChanged {
        from: u8,
        to: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User left the wizard by going back from the first step
    WizardExited {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Image upload failed; the placeholder image is used instead
    ///
    /// Non-fatal: the publish continues.
    MediaUploadDegraded {
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Listing created and draft discarded
    ListingPublished {
        listing_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Listing creation failed; draft preserved for retry
    PublishFailed {
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl WizardEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            WizardEvent::DraftSaved { .. } => "DraftSaved",
            WizardEvent::StepChanged { .. } => "StepChanged",
            WizardEvent::WizardExited { .. } => "WizardExited",
            WizardEvent::MediaUploadDegraded { .. } => "MediaUploadDegraded",
            WizardEvent::ListingPublished { .. } => "ListingPublished",
            WizardEvent::PublishFailed { .. } => "PublishFailed",
        }
    }
}

/// Broadcast bus for [`WizardEvent`]s
///
/// Cloning shares the underlying channel.
///
/// # Examples
///
/// ```
/// use gigboard_common::events::{EventBus, WizardEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
/// bus.emit_lossy(WizardEvent::WizardExited { timestamp: chrono::Utc::now() });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WizardEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WizardEvent,
    ) -> Result<usize, broadcast::error::SendError<WizardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WizardEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
