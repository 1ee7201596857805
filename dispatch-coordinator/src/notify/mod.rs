//! Topology-change notification plumbing.
//!
//! Registry mutations enqueue here and return; a background worker owns
//! delivery. The queue is the deterministic seam: tests assert against what
//! was enqueued/delivered instead of racing a webhook client.

mod transport;
mod worker;

pub use transport::{LogTransport, NotificationTransport};
pub use worker::NotifierWorker;

use coordinator_protocol::model::TopologyEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// A single delivery attempt: one topology event addressed to one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub token: String,
    pub attributes: Value,
    pub event: TopologyEvent,
}

/// Sender half of the notification queue.
///
/// A wrapper around a tokio unbounded channel, so publishing is typed and
/// never waits on delivery.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::UnboundedSender<Notification>,
}

impl NotificationQueue {
    /// Creates the queue and hands back the receiver for the worker.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Enqueue one delivery attempt.
    ///
    /// We ignore the error if the worker is already gone (teardown in
    /// progress); the mutation that caused the event has already committed.
    pub fn publish(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_protocol::model::{Endpoint, TopologyChange};

    fn notification(token: &str) -> Notification {
        Notification {
            token: token.to_string(),
            attributes: Value::Null,
            event: TopologyEvent {
                service_id: "svc-test".to_string(),
                change: TopologyChange::InstanceAdded,
                endpoint: Endpoint {
                    ip: "localhost".to_string(),
                    port: 12345,
                    api: "/test".to_string(),
                },
                timestamp_ms: 0,
            },
        }
    }

    #[test]
    fn test_publish_preserves_order() {
        let (queue, mut receiver) = NotificationQueue::channel();
        queue.publish(notification("a"));
        queue.publish(notification("b"));

        assert_eq!(receiver.try_recv().unwrap().token, "a");
        assert_eq!(receiver.try_recv().unwrap().token, "b");
    }

    #[test]
    fn test_publish_after_receiver_dropped_is_silent() {
        let (queue, receiver) = NotificationQueue::channel();
        drop(receiver);
        // Must not panic or block.
        queue.publish(notification("a"));
    }
}
