use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoordinatorConfig {
    /// Deliver notifications still queued when shutdown is requested, instead
    /// of dropping them with the worker.
    pub drain_on_shutdown: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            drain_on_shutdown: true,
        }
    }
}
