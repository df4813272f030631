//! # shipdesk-core
//!
//! Core crate for the ShipDesk admin security core. Contains configuration
//! schemas, capability traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ShipDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{SecurityError, TokenErrorKind};
pub use result::SecurityResult;
