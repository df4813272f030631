//! # shipdesk-audit
//!
//! Bounded, queryable, append-only security event log. The log is a ring
//! buffer: once the configured capacity is reached, the oldest event is
//! evicted to make room for each new append.

pub mod event;
pub mod log;

pub use event::{CreateSecurityEvent, SecurityAction, SecurityEvent};
pub use log::{AuditLog, EventFilter};
