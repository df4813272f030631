//! Session token validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use shipdesk_core::config::SessionConfig;
use shipdesk_core::{SecurityError, SecurityResult, TokenErrorKind};

use super::claims::SessionClaims;

/// Checks a session token's signature, absolute expiry, and idle window.
///
/// Claims are HMAC-SHA256 verified against the server-held secret before
/// anything in them is trusted.
#[derive(Clone)]
pub struct SessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    idle_timeout: Duration,
}

impl std::fmt::Debug for SessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionValidator")
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl SessionValidator {
    /// Creates a validator from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry and idle checks run against an explicit clock below so
        // they stay deterministic; the library only verifies the signature.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            idle_timeout: Duration::minutes(config.session_timeout_minutes as i64),
        }
    }

    /// Validates a token against the current clock.
    pub fn validate(&self, token: &str) -> SecurityResult<SessionClaims> {
        self.validate_at(token, Utc::now())
    }

    /// [`SessionValidator::validate`] with an explicit clock.
    ///
    /// Checks, in order: signature/shape, absolute expiry, idle window.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> SecurityResult<SessionClaims> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| SecurityError::Token(TokenErrorKind::Invalid))?;

        if now.timestamp() > claims.exp {
            return Err(SecurityError::Token(TokenErrorKind::Expired));
        }
        if now - claims.issued_at() > self.idle_timeout {
            return Err(SecurityError::Token(TokenErrorKind::IdleTimeout));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionIssuer;

    fn config() -> SessionConfig {
        SessionConfig {
            token_secret: "unit-test-secret".to_string(),
            session_timeout_minutes: 30,
            token_ttl_hours: 12,
        }
    }

    #[test]
    fn test_valid_token_round_trip() {
        let issuer = SessionIssuer::new(&config());
        let validator = SessionValidator::new(&config());

        let token = issuer.issue("ops@shipdesk.test").unwrap();
        let claims = validator.validate(&token).unwrap();
        assert_eq!(claims.sub, "ops@shipdesk.test");
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let validator = SessionValidator::new(&config());
        let err = validator.validate("not-a-token").unwrap_err();
        assert!(matches!(
            err,
            SecurityError::Token(TokenErrorKind::Invalid)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = SessionIssuer::new(&config());
        let other = SessionValidator::new(&SessionConfig {
            token_secret: "a-different-secret".to_string(),
            ..config()
        });

        let token = issuer.issue("ops@shipdesk.test").unwrap();
        let err = other.validate(&token).unwrap_err();
        assert!(matches!(
            err,
            SecurityError::Token(TokenErrorKind::Invalid)
        ));
    }

    #[test]
    fn test_expired_token() {
        let issuer = SessionIssuer::new(&config());
        let validator = SessionValidator::new(&config());

        let token = issuer.issue("ops@shipdesk.test").unwrap();
        let err = validator
            .validate_at(&token, Utc::now() + Duration::hours(13))
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::Token(TokenErrorKind::Expired)
        ));
    }

    #[test]
    fn test_idle_timeout_before_expiry() {
        let issuer = SessionIssuer::new(&config());
        let validator = SessionValidator::new(&config());

        // 31 minutes in: absolute expiry (12h) has not passed, but the
        // idle window (30m) has.
        let token = issuer.issue("ops@shipdesk.test").unwrap();
        let err = validator
            .validate_at(&token, Utc::now() + Duration::minutes(31))
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::Token(TokenErrorKind::IdleTimeout)
        ));
    }
}
