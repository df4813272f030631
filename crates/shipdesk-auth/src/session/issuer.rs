//! Session token issuance.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use shipdesk_core::config::SessionConfig;
use shipdesk_core::{SecurityError, SecurityResult};

use super::claims::SessionClaims;

/// Mints signed session tokens for the admin login flow.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer").field("ttl", &self.ttl).finish()
    }
}

impl SessionIssuer {
    /// Creates an issuer from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            ttl: Duration::hours(config.token_ttl_hours as i64),
        }
    }

    /// Issues a signed token for `subject`, valid from now until the
    /// configured absolute lifetime.
    pub fn issue(&self, subject: &str) -> SecurityResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SecurityError::Configuration(format!("failed to sign session token: {e}")))
    }
}
