//! Internal event bus for session and catalog changes
//!
//! Mutations of the application state (sign-in, sign-out, new listings, page
//! changes) are published here so that views can re-run their queries against
//! the next snapshot instead of being poked directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(64);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(MarketEvent::ListingAdded {
//!     listing_id: "1739900000000".to_string(),
//!     name: "Starch".to_string(),
//!     seller: "Acme".to_string(),
//! });
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{}", envelope.event.action());
//! }
//! ```

use crate::core::user::{Page, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Application-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A user became the current user
    SessionStarted { user: User },
    /// The current user signed out
    SessionEnded { email: String },
    /// A listing was prepended to the catalog
    ListingAdded {
        listing_id: String,
        name: String,
        seller: String,
    },
    /// The current page changed
    PageChanged { page: Page },
}

impl MarketEvent {
    /// Get the action name
    pub fn action(&self) -> &'static str {
        match self {
            MarketEvent::SessionStarted { .. } => "session_started",
            MarketEvent::SessionEnded { .. } => "session_ended",
            MarketEvent::ListingAdded { .. } => "listing_added",
            MarketEvent::PageChanged { .. } => "page_changed",
        }
    }

    /// Whether views over the listing snapshot must be recomputed
    pub fn invalidates_listings(&self) -> bool {
        matches!(self, MarketEvent::ListingAdded { .. })
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: MarketEvent,
}

impl EventEnvelope {
    pub fn new(event: MarketEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: MarketEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // Err only means nobody is listening
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
