//! In-memory set of live endpoints for a single service.
//!
//! This struct is PURE data. It does not lock and it does not notify;
//! the catalog owns synchronization and notification fanout.

use coordinator_protocol::model::{Endpoint, EndpointKey};
use std::collections::BTreeMap;

/// The set of endpoints currently implementing one service, keyed by
/// `(ip, port)`. Kept in a `BTreeMap` so snapshots have a stable order for
/// the balancer cursor.
#[derive(Debug, Default, Clone)]
pub struct InstanceRegistry {
    entries: BTreeMap<EndpointKey, Endpoint>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or refresh an endpoint.
    ///
    /// Re-registering a live `(ip, port)` is an idempotent update (the `api`
    /// path may have changed), never an error.
    pub fn register(&mut self, endpoint: Endpoint) {
        self.entries.insert(endpoint.key(), endpoint);
    }

    /// Remove the endpoint registered at `(ip, port)`.
    ///
    /// Returns the removed entry, or `None` when nothing matched. The caller
    /// surfaces `None` as a conflict: the service exists, the instance does
    /// not.
    pub fn deregister(&mut self, ip: &str, port: u16) -> Option<Endpoint> {
        self.entries.remove(&(ip.to_string(), port))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Point-in-time copy of the current entries in key order, for the
    /// balancer. Selection never observes a half-mutated set.
    pub fn snapshot(&self) -> Vec<Endpoint> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(ip: &str, port: u16) -> Endpoint {
        Endpoint {
            ip: ip.to_string(),
            port,
            api: "/test".to_string(),
        }
    }

    #[test]
    fn test_register_is_idempotent_on_same_key() {
        let mut registry = InstanceRegistry::new();
        registry.register(endpoint("localhost", 12345));

        // Same (ip, port), new api path: update in place, no duplicate.
        let mut updated = endpoint("localhost", 12345);
        updated.api = "/v2".to_string();
        registry.register(updated.clone());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot(), vec![updated]);
    }

    #[test]
    fn test_deregister_unknown_endpoint_returns_none() {
        let mut registry = InstanceRegistry::new();
        registry.register(endpoint("localhost", 12345));

        assert!(registry.deregister("localhost", 9999).is_none());
        assert!(registry.deregister("localhost", 12345).is_some());
        // A second removal of the same pair is again a miss, not a no-op.
        assert!(registry.deregister("localhost", 12345).is_none());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_mutation() {
        let mut registry = InstanceRegistry::new();
        registry.register(endpoint("10.0.0.1", 80));
        let snapshot = registry.snapshot();

        registry.register(endpoint("10.0.0.2", 80));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
