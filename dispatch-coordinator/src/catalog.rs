//! The top-level aggregate: the id -> definition map, the dependency graph,
//! and every per-service operation.
//!
//! Locking discipline: structural changes (create, alter, delete) hold the
//! catalog write lock for the whole mutation. Reads and per-service traffic
//! (register, deregister, subscribe, unsubscribe, select) take the read lock
//! only long enough to clone the entry handle, then serialize on that
//! service's own mutex, so traffic to different services never contends. The
//! entry mutex is never held while acquiring the catalog lock.

use crate::balancer::{balancer_for, Balancer};
use crate::graph::DependencyGraph;
use crate::notify::NotificationQueue;
use crate::registry::InstanceRegistry;
use crate::subscription::SubscriptionManager;
use crate::validation;
use chrono::Utc;
use coordinator_protocol::error::{CoordinatorError, Result};
use coordinator_protocol::model::{
    ArgumentValue, Endpoint, ServiceDefinition, ServiceId, ServiceRecord, Subscription,
    TopologyChange, TopologyEvent,
};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// Everything owned by one service and guarded by its mutex.
struct ServiceState {
    definition: ServiceDefinition,
    registry: InstanceRegistry,
    subscriptions: SubscriptionManager,
    balancer: Box<dyn Balancer>,
    /// Set under the catalog write lock during delete. Callers that cloned
    /// the entry handle before the removal observe the service as gone.
    retired: bool,
}

struct ServiceEntry {
    id: ServiceId,
    state: Mutex<ServiceState>,
}

/// Guarded together so existence checks, dependency references and the
/// check-then-delete are consistent at the instant they run.
struct CatalogInner {
    services: HashMap<ServiceId, Arc<ServiceEntry>>,
    graph: DependencyGraph,
}

/// The service catalog. One per coordinator, shared by reference with every
/// request handler.
pub struct ServiceCatalog {
    inner: RwLock<CatalogInner>,
    notifications: NotificationQueue,
}

impl ServiceCatalog {
    pub fn new(notifications: NotificationQueue) -> Self {
        Self {
            inner: RwLock::new(CatalogInner {
                services: HashMap::new(),
                graph: DependencyGraph::new(),
            }),
            notifications,
        }
    }

    /// Validates, assigns a fresh id, and stores the definition.
    pub fn create(&self, definition: ServiceDefinition) -> Result<ServiceRecord> {
        validation::validate_definition(&definition)?;

        let mut inner = self.inner.write().unwrap();
        DependencyGraph::validate_references(&definition.dependencies, |id| {
            inner.services.contains_key(id)
        })?;

        let id = format!("svc-{}", Uuid::new_v4());
        inner.graph.insert(&id, definition.dependencies.clone());
        inner.services.insert(
            id.clone(),
            Arc::new(ServiceEntry {
                id: id.clone(),
                state: Mutex::new(ServiceState {
                    balancer: balancer_for(definition.mode),
                    definition: definition.clone(),
                    registry: InstanceRegistry::new(),
                    subscriptions: SubscriptionManager::new(),
                    retired: false,
                }),
            }),
        );

        info!("Catalog: created service '{}'", id);
        Ok(ServiceRecord { id, definition })
    }

    /// Returns the current definition of a service.
    pub fn get(&self, id: &str) -> Result<ServiceRecord> {
        let entry = self.entry(id)?;
        let state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }
        Ok(ServiceRecord {
            id: entry.id.clone(),
            definition: state.definition.clone(),
        })
    }

    /// Lazy iteration over all definitions.
    ///
    /// The id snapshot is taken up front and each entry is resolved on
    /// advance: services deleted mid-iteration are skipped, nothing is
    /// duplicated, and a fresh call restarts the walk. Snapshot consistency
    /// across concurrent mutation is deliberately not promised.
    pub fn list(&self) -> ServiceIter<'_> {
        let mut ids: Vec<ServiceId> = self
            .inner
            .read()
            .unwrap()
            .services
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ServiceIter {
            catalog: self,
            ids,
            position: 0,
        }
    }

    /// Replaces every attribute except the id, re-validating exactly as
    /// `create` does. The live instance registry and subscriptions survive.
    pub fn alter(&self, id: &str, definition: ServiceDefinition) -> Result<ServiceRecord> {
        let mut inner = self.inner.write().unwrap();
        let entry = match inner.services.get(id) {
            Some(entry) => entry.clone(),
            None => return Err(CoordinatorError::NotFound(id.to_string())),
        };

        // Unknown ids fail before validation does; an id that exists gets the
        // same validation pass as create.
        validation::validate_definition(&definition)?;
        DependencyGraph::validate_references(&definition.dependencies, |dependency| {
            inner.services.contains_key(dependency)
        })?;
        inner.graph.insert(id, definition.dependencies.clone());

        let mut state = entry.state.lock().unwrap();
        if state.balancer.mode() != definition.mode {
            // New strategy, fresh cursor. An unchanged mode keeps its state.
            state.balancer = balancer_for(definition.mode);
        }
        state.definition = definition.clone();

        info!("Catalog: altered service '{}'", id);
        Ok(ServiceRecord {
            id: id.to_string(),
            definition,
        })
    }

    /// Removes a service unless another definition still depends on it.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let entry = match inner.services.get(id) {
            Some(entry) => entry.clone(),
            None => return Err(CoordinatorError::NotFound(id.to_string())),
        };

        let dependents = inner.graph.dependents_of(id);
        if !dependents.is_empty() {
            return Err(CoordinatorError::DependedUpon {
                service_id: id.to_string(),
                dependents,
            });
        }

        // Take the service lock after the dependent check so in-flight
        // per-service calls finish first and later ones observe the
        // retirement. No dependent can appear concurrently: declaring one
        // needs the write lock we are holding.
        {
            let mut state = entry.state.lock().unwrap();
            state.retired = true;
        }
        inner.services.remove(id);
        inner.graph.remove(id);

        info!("Catalog: deleted service '{}'", id);
        Ok(())
    }

    /// Adds (or refreshes) an instance endpoint and notifies subscribers.
    pub fn register(&self, id: &str, endpoint: Endpoint) -> Result<()> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }

        state.registry.register(endpoint.clone());
        debug!(
            "Catalog: registered {}:{} for '{}'",
            endpoint.ip, endpoint.port, id
        );
        self.publish_topology(&state, id, TopologyChange::InstanceAdded, endpoint);
        Ok(())
    }

    /// Removes the instance at `(ip, port)` and notifies subscribers.
    pub fn deregister(&self, id: &str, ip: &str, port: u16) -> Result<()> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }

        match state.registry.deregister(ip, port) {
            Some(endpoint) => {
                debug!("Catalog: deregistered {}:{} for '{}'", ip, port, id);
                self.publish_topology(&state, id, TopologyChange::InstanceRemoved, endpoint);
                Ok(())
            }
            None => Err(CoordinatorError::EndpointNotRegistered {
                service_id: id.to_string(),
                ip: ip.to_string(),
                port,
            }),
        }
    }

    /// Registers interest in topology changes; returns the fresh token.
    pub fn subscribe(&self, id: &str, attributes: Value) -> Result<Subscription> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }
        let subscription = state.subscriptions.subscribe(attributes);
        debug!("Catalog: subscribed token {} to '{}'", subscription.token, id);
        Ok(subscription)
    }

    /// Drops the subscription with the given token.
    pub fn unsubscribe(&self, id: &str, token: &str) -> Result<()> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }
        if state.subscriptions.unsubscribe(token) {
            debug!("Catalog: unsubscribed token {} from '{}'", token, id);
            Ok(())
        } else {
            Err(CoordinatorError::UnknownSubscription {
                service_id: id.to_string(),
                token: token.to_string(),
            })
        }
    }

    /// Picks one endpoint with the service's balancing strategy.
    pub fn select_endpoint(&self, id: &str) -> Result<Endpoint> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }
        Self::select_locked(&mut state, id)
    }

    /// Validates the supplied arguments against the current parameter schema,
    /// then selects an endpoint for the invocation.
    pub fn dispatch(&self, id: &str, arguments: &[Option<ArgumentValue>]) -> Result<Endpoint> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock().unwrap();
        if state.retired {
            return Err(CoordinatorError::NotFound(id.to_string()));
        }
        validation::validate_arguments(&state.definition.parameters, arguments)?;
        Self::select_locked(&mut state, id)
    }

    fn select_locked(state: &mut ServiceState, id: &str) -> Result<Endpoint> {
        // Snapshot and selection happen under the service lock, so a
        // completed deregistration is never observed by a later selection.
        let snapshot = state.registry.snapshot();
        let index = state
            .balancer
            .select(&snapshot)
            .ok_or_else(|| CoordinatorError::NoAvailableInstance(id.to_string()))?;
        Ok(snapshot[index].clone())
    }

    fn entry(&self, id: &str) -> Result<Arc<ServiceEntry>> {
        let inner = self.inner.read().unwrap();
        inner
            .services
            .get(id)
            .cloned()
            .ok_or_else(|| CoordinatorError::NotFound(id.to_string()))
    }

    /// One notification per token subscribed right now, pushed to the queue
    /// while the service lock is held so queue order matches mutation order.
    /// The mutating caller never waits on delivery.
    fn publish_topology(
        &self,
        state: &ServiceState,
        id: &str,
        change: TopologyChange,
        endpoint: Endpoint,
    ) {
        let event = TopologyEvent {
            service_id: id.to_string(),
            change,
            endpoint,
            timestamp_ms: Utc::now().timestamp_millis(),
        };
        for notification in state.subscriptions.fanout(&event) {
            self.notifications.publish(notification);
        }
    }
}

/// Lazy walk over the catalog produced by [`ServiceCatalog::list`].
pub struct ServiceIter<'a> {
    catalog: &'a ServiceCatalog,
    ids: Vec<ServiceId>,
    position: usize,
}

impl Iterator for ServiceIter<'_> {
    type Item = ServiceRecord;

    fn next(&mut self) -> Option<ServiceRecord> {
        while self.position < self.ids.len() {
            let id = self.ids[self.position].clone();
            self.position += 1;
            if let Ok(record) = self.catalog.get(&id) {
                return Some(record);
            }
            // Deleted since the id snapshot: skip, never fabricate.
        }
        None
    }
}
