//! Selection strategies over instance registry snapshots.

mod round_robin;

pub use round_robin::RoundRobinBalancer;

use coordinator_protocol::model::{Endpoint, LbMode};

/// Strategy for picking one endpoint out of a registry snapshot.
///
/// A balancer is owned by one service and called under that service's lock,
/// so implementations keep plain mutable state (a cursor, counters) without
/// synchronizing themselves.
pub trait Balancer: Send {
    /// The mode this strategy implements, for logging and alter bookkeeping.
    fn mode(&self) -> LbMode;

    /// Index of the chosen endpoint in `snapshot`, or `None` when the
    /// snapshot is empty.
    fn select(&mut self, snapshot: &[Endpoint]) -> Option<usize>;
}

/// Strategy registry: one arm per `LbMode`.
///
/// Adding a mode means adding a variant and an implementation here; the
/// catalog contract does not change.
pub fn balancer_for(mode: LbMode) -> Box<dyn Balancer> {
    match mode {
        LbMode::RoundRobin => Box::new(RoundRobinBalancer::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_mode() {
        let balancer = balancer_for(LbMode::RoundRobin);
        assert_eq!(balancer.mode(), LbMode::RoundRobin);
    }
}
