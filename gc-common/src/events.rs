//! Collection change events and the broadcast bus carrying them
//!
//! The UI subscribes over SSE and uses these to show the
//! "saving… / saved" indicator and to refresh its views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Where a batch of new records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Spreadsheet,
    SyncCode,
    Manual,
}

/// Collection change notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GarageEvent {
    /// Records were prepended to the collection
    RecordsAdded {
        count: usize,
        source: RecordSource,
        timestamp: DateTime<Utc>,
    },

    /// Records were deleted
    RecordsRemoved {
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A record's photo changed
    ImageUpdated {
        id: String,
        timestamp: DateTime<Utc>,
    },

    /// The full collection was written to storage
    CollectionSaved {
        record_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl GarageEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            GarageEvent::RecordsAdded { .. } => "RecordsAdded",
            GarageEvent::RecordsRemoved { .. } => "RecordsRemoved",
            GarageEvent::ImageUpdated { .. } => "ImageUpdated",
            GarageEvent::CollectionSaved { .. } => "CollectionSaved",
        }
    }
}

/// Broadcast bus for [`GarageEvent`]s
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GarageEvent>,
    capacity: usize,
}

impl EventBus {
    /// `capacity` events are buffered per subscriber before the oldest are dropped
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Receive all events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<GarageEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the case where nobody is listening
    pub fn emit_lossy(&self, event: GarageEvent) {
        let _ = self.tx.send(event);
    }

    /// Emit the usual pair for a committed change: the change itself, then
    /// `CollectionSaved` with the new size.
    pub fn emit_saved(&self, change: GarageEvent, record_count: usize) {
        self.emit_lossy(change);
        self.emit_lossy(GarageEvent::CollectionSaved {
            record_count,
            timestamp: Utc::now(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_saved_sends_change_then_saved() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit_saved(
            GarageEvent::RecordsRemoved {
                count: 2,
                timestamp: Utc::now(),
            },
            5,
        );

        assert_eq!(rx.recv().await.unwrap().event_type(), "RecordsRemoved");
        match rx.recv().await.unwrap() {
            GarageEvent::CollectionSaved { record_count, .. } => assert_eq!(record_count, 5),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        bus.emit_lossy(GarageEvent::ImageUpdated {
            id: "a".to_string(),
            timestamp: Utc::now(),
        });
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_serialized_with_type_tag() {
        let event = GarageEvent::RecordsAdded {
            count: 3,
            source: RecordSource::SyncCode,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RecordsAdded");
        assert_eq!(json["source"], "sync_code");
    }
}
