//! Construction and teardown of the whole engine.
//!
//! There is no ambient global state: the coordinator owns the catalog and
//! the notification worker, and request handlers receive `Arc<ServiceCatalog>`
//! clones from it.

use crate::catalog::ServiceCatalog;
use crate::config::CoordinatorConfig;
use crate::notify::{NotificationQueue, NotificationTransport, NotifierWorker};
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct DispatchCoordinator {
    catalog: Arc<ServiceCatalog>,
    shutdown: Arc<Notify>,
    worker: JoinHandle<()>,
}

impl DispatchCoordinator {
    /// Builds the catalog, wires the notification queue, and spawns the
    /// delivery worker on the current runtime.
    pub fn new(config: CoordinatorConfig, transport: Arc<dyn NotificationTransport>) -> Self {
        let (queue, receiver) = NotificationQueue::channel();
        let catalog = Arc::new(ServiceCatalog::new(queue));
        let shutdown = Arc::new(Notify::new());

        let worker = NotifierWorker::new(receiver, transport, config.drain_on_shutdown);
        let handle = tokio::spawn(worker.run(shutdown.clone()));

        info!("Coordinator: started");
        Self {
            catalog,
            shutdown,
            worker: handle,
        }
    }

    /// Shared handle for request handlers.
    pub fn catalog(&self) -> Arc<ServiceCatalog> {
        self.catalog.clone()
    }

    /// Stops the delivery worker and waits for it to exit. With
    /// `drain_on_shutdown` set, notifications already enqueued are delivered
    /// first.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.worker.await {
            error!("Coordinator: notifier task failed: {:?}", e);
        }
        info!("Coordinator: stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogTransport;
    use coordinator_protocol::model::{LbMode, Method, ServiceDefinition};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_lifecycle_construct_use_teardown() {
        let coordinator =
            DispatchCoordinator::new(CoordinatorConfig::default(), Arc::new(LogTransport));
        let catalog = coordinator.catalog();

        let definition = ServiceDefinition {
            description: "lifecycle".to_string(),
            methods: BTreeSet::from([Method::Get]),
            parameters: vec![],
            mode: LbMode::RoundRobin,
            dependencies: BTreeSet::new(),
            version: "1.0".to_string(),
            platform_version: "rust-stable".to_string(),
        };
        let record = catalog.create(definition).unwrap();
        catalog.delete(&record.id).unwrap();

        coordinator.shutdown().await;
    }
}
