use super::Balancer;
use coordinator_protocol::model::{Endpoint, LbMode};

/// Round-robin selection: a monotonically advancing cursor interpreted modulo
/// the snapshot size.
///
/// When the snapshot composition changes between selections, the cursor is
/// simply reinterpreted against the new ordering; there is no attempt to
/// preserve "whose turn it was" across a topology change.
#[derive(Debug, Default)]
pub struct RoundRobinBalancer {
    cursor: usize,
}

impl RoundRobinBalancer {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }
}

impl Balancer for RoundRobinBalancer {
    fn mode(&self) -> LbMode {
        LbMode::RoundRobin
    }

    fn select(&mut self, snapshot: &[Endpoint]) -> Option<usize> {
        if snapshot.is_empty() {
            return None;
        }
        let index = self.cursor % snapshot.len();
        self.cursor = self.cursor.wrapping_add(1);
        Some(index)
    }
}
