//! Audit log configuration.

use serde::{Deserialize, Serialize};

/// Audit log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Maximum number of events retained; the oldest entry is evicted
    /// once the buffer is full.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    1000
}
