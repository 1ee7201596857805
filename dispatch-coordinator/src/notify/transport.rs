use super::Notification;
use anyhow::Result;
use async_trait::async_trait;
use log::info;

/// The abstraction for actual subscriber delivery.
///
/// Implement this for a webhook client, a message bus, etc. The engine
/// guarantees exactly one `deliver` call per subscribed token per topology
/// change; retry and delivery-guarantee policy belong behind this trait.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Default transport: logs the delivery and succeeds.
///
/// Stands in wherever no real delivery client is wired up (demos, tests that
/// only care about engine state).
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        info!(
            "Notify: {:?} {}:{} of '{}' -> token {}",
            notification.event.change,
            notification.event.endpoint.ip,
            notification.event.endpoint.port,
            notification.event.service_id,
            notification.token
        );
        Ok(())
    }
}
