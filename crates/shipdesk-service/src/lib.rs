//! # shipdesk-service
//!
//! Composition layer for the security core. [`SecurityStore`] is the
//! explicit dependency-injection object constructed at process start and
//! passed by reference to the request-handling layer; it replaces the
//! module-level singletons the original portal relied on, so tests can
//! run multiple isolated instances.

pub mod persist;
pub mod store;

pub use persist::NamespaceStore;
pub use store::SecurityStore;
