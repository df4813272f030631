//! Origin allow-listing and login-attempt configuration.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Admin access gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Origins permitted to reach the admin interface.
    ///
    /// An empty list disables origin restriction entirely.
    #[serde(default)]
    pub allowlist: Vec<IpAddr>,
    /// Consecutive failed attempts before an identity is locked out.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Sliding window in minutes within which failures accumulate.
    #[serde(default = "default_attempt_window")]
    pub attempt_window_minutes: u64,
    /// How long a locked identity stays locked, in minutes.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_minutes: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowlist: Vec::new(),
            max_attempts: default_max_attempts(),
            attempt_window_minutes: default_attempt_window(),
            lockout_duration_minutes: default_lockout_duration(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_attempt_window() -> u64 {
    15
}

fn default_lockout_duration() -> u64 {
    15
}
