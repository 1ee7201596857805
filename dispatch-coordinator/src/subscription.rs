//! Per-service subscriber bookkeeping.

use crate::notify::Notification;
use coordinator_protocol::model::{Subscription, TopologyEvent};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Token -> delivery attributes for one service's subscribers.
///
/// Pure data, like the instance registry: the catalog serializes access and
/// pushes the fanout to the notification queue.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    subscriptions: BTreeMap<String, Value>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
        }
    }

    /// Store a new subscription under a fresh token.
    pub fn subscribe(&mut self, attributes: Value) -> Subscription {
        let token = Uuid::new_v4().to_string();
        self.subscriptions.insert(token.clone(), attributes.clone());
        Subscription { token, attributes }
    }

    /// Remove the subscription with the given token.
    ///
    /// Returns whether anything was removed; the caller surfaces `false` as a
    /// conflict.
    pub fn unsubscribe(&mut self, token: &str) -> bool {
        self.subscriptions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// One notification per currently subscribed token, in token order.
    ///
    /// Built under the service lock, so the enqueue order of the results
    /// matches the order the mutations happened in.
    pub fn fanout(&self, event: &TopologyEvent) -> Vec<Notification> {
        self.subscriptions
            .iter()
            .map(|(token, attributes)| Notification {
                token: token.clone(),
                attributes: attributes.clone(),
                event: event.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_protocol::model::{Endpoint, TopologyChange};

    fn event() -> TopologyEvent {
        TopologyEvent {
            service_id: "svc-test".to_string(),
            change: TopologyChange::InstanceAdded,
            endpoint: Endpoint {
                ip: "localhost".to_string(),
                port: 12345,
                api: "/test".to_string(),
            },
            timestamp_ms: 0,
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let mut manager = SubscriptionManager::new();
        let first = manager.subscribe(Value::Null);
        let second = manager.subscribe(Value::Null);
        assert_ne!(first.token, second.token);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_unsubscribe_symmetry() {
        let mut manager = SubscriptionManager::new();
        let subscription = manager.subscribe(Value::Null);

        assert!(manager.unsubscribe(&subscription.token));
        // Exactly one matching unsubscribe succeeds; a repeat is a miss.
        assert!(!manager.unsubscribe(&subscription.token));
        assert!(!manager.unsubscribe("no-such-token"));
    }

    #[test]
    fn test_fanout_addresses_every_subscriber() {
        let mut manager = SubscriptionManager::new();
        let first = manager.subscribe(serde_json::json!({"url": "http://a"}));
        let second = manager.subscribe(serde_json::json!({"url": "http://b"}));

        let notifications = manager.fanout(&event());
        assert_eq!(notifications.len(), 2);

        let tokens: Vec<&str> = notifications
            .iter()
            .map(|notification| notification.token.as_str())
            .collect();
        assert!(tokens.contains(&first.token.as_str()));
        assert!(tokens.contains(&second.token.as_str()));

        for notification in &notifications {
            assert_eq!(notification.event, event());
        }
    }
}
