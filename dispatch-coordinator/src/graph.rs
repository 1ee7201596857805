//! Declared dependency edges between services.
//!
//! The adjacency lives next to the id map and is mutated only under the
//! catalog write lock, so reference checks and the check-then-delete guard
//! are always consistent with the set of existing services.
//!
//! Dependencies are declarative references, not an execution order, so there
//! is no cycle detection; the adjacency form leaves room to add it.

use coordinator_protocol::error::{CoordinatorError, Result};
use coordinator_protocol::model::ServiceId;
use std::collections::{BTreeSet, HashMap};

/// Which service declares which other services as dependencies.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    declared: HashMap<ServiceId, BTreeSet<ServiceId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            declared: HashMap::new(),
        }
    }

    /// Every referenced id must already exist. Collects all unknown ids into
    /// one error.
    pub fn validate_references<F>(dependencies: &BTreeSet<ServiceId>, exists: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        let missing: Vec<ServiceId> = dependencies
            .iter()
            .filter(|id| !exists(id))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoordinatorError::UnknownDependency(missing))
        }
    }

    /// Record (or replace) the declared dependencies of a service.
    pub fn insert(&mut self, id: &str, dependencies: BTreeSet<ServiceId>) {
        self.declared.insert(id.to_string(), dependencies);
    }

    pub fn remove(&mut self, id: &str) {
        self.declared.remove(id);
    }

    /// Services other than `id` that declare `id` as a dependency. A
    /// non-empty result blocks deletion.
    pub fn dependents_of(&self, id: &str) -> Vec<ServiceId> {
        let mut dependents: Vec<ServiceId> = self
            .declared
            .iter()
            .filter(|(owner, dependencies)| owner.as_str() != id && dependencies.contains(id))
            .map(|(owner, _)| owner.clone())
            .collect();
        dependents.sort();
        dependents
    }
}
