//! # Dispatch Coordinator
//!
//! In-memory control plane for service discovery and dispatch: a catalog of
//! service definitions, live endpoint registries, topology-change
//! subscriptions, and load-balanced endpoint selection.
//!
//! ## Modules
//! - `catalog`: the id -> definition aggregate and all per-service operations.
//! - `validation`: parameter schema and invocation argument checks.
//! - `graph`: declared dependency edges and the delete guard.
//! - `registry`: per-service endpoint sets.
//! - `balancer`: pluggable selection strategies over registry snapshots.
//! - `subscription`: per-service token tables and notification fanout.
//! - `notify`: notification queue, delivery worker and the transport seam.
//! - `coordinator`: construction and teardown of the whole engine.
//! - `api`: transport-facing command dispatcher.

pub mod api;
pub mod balancer;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod graph;
pub mod notify;
pub mod registry;
pub mod subscription;
pub mod validation;

pub use catalog::ServiceCatalog;
pub use config::CoordinatorConfig;
pub use coordinator::DispatchCoordinator;
