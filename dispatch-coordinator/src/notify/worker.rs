use super::{Notification, NotificationTransport};
use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;

/// Consumes the notification queue and hands each entry to the transport.
///
/// Delivery order follows queue order, which follows per-service mutation
/// order. A failed delivery is logged and skipped; the topology change it
/// describes has already committed, so there is nothing to roll back.
pub struct NotifierWorker {
    receiver: UnboundedReceiver<Notification>,
    transport: Arc<dyn NotificationTransport>,
    drain_on_shutdown: bool,
}

impl NotifierWorker {
    pub fn new(
        receiver: UnboundedReceiver<Notification>,
        transport: Arc<dyn NotificationTransport>,
        drain_on_shutdown: bool,
    ) -> Self {
        Self {
            receiver,
            transport,
            drain_on_shutdown,
        }
    }

    /// Delivery loop. Runs until the queue closes or `shutdown` fires, so
    /// spawn it in a task.
    pub async fn run(mut self, shutdown: Arc<Notify>) {
        info!("Notifier: delivery loop started");
        loop {
            tokio::select! {
                received = self.receiver.recv() => match received {
                    Some(notification) => self.deliver(notification).await,
                    // Every queue handle dropped: nothing more can arrive.
                    None => break,
                },
                _ = shutdown.notified() => {
                    if self.drain_on_shutdown {
                        while let Ok(notification) = self.receiver.try_recv() {
                            self.deliver(notification).await;
                        }
                    }
                    break;
                }
            }
        }
        info!("Notifier: delivery loop stopped");
    }

    async fn deliver(&self, notification: Notification) {
        if let Err(e) = self.transport.deliver(&notification).await {
            error!(
                "Notifier: delivery to token {} failed: {:?}",
                notification.token, e
            );
        }
    }
}
