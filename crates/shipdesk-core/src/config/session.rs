//! Session token configuration.

use serde::{Deserialize, Serialize};

/// Session token validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    /// Idle timeout in minutes, measured from the token's issue time.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u64,
    /// Absolute token lifetime in hours, used when issuing tokens.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            session_timeout_minutes: default_session_timeout(),
            token_ttl_hours: default_token_ttl(),
        }
    }
}

fn default_token_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_session_timeout() -> u64 {
    30
}

fn default_token_ttl() -> u64 {
    12
}
