//! Unified error types for the ShipDesk security core.
//!
//! Every crate maps its failures into [`SecurityError`] for consistent
//! propagation through the ? operator. Password-policy violations are
//! deliberately *not* represented here: they are returned as data
//! (`PasswordValidation.errors`) so a caller can render every violation
//! at once.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorKind {
    /// The token could not be decoded or its signature did not verify.
    Invalid,
    /// The token's absolute expiry has passed.
    Expired,
    /// The token's issue time is older than the idle-timeout window.
    IdleTimeout,
}

impl fmt::Display for TokenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid"),
            Self::Expired => write!(f, "expired"),
            Self::IdleTimeout => write!(f, "idle-timeout"),
        }
    }
}

/// The unified error used throughout the security core.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The request origin is not on the admin allow-list.
    #[error("origin {origin} is not on the admin allow-list")]
    AccessDenied {
        /// The rejected source address.
        origin: IpAddr,
    },

    /// The identity is locked out after too many failed attempts.
    #[error("account locked until {until}")]
    AccountLocked {
        /// When the lockout expires.
        until: DateTime<Utc>,
    },

    /// A session token was rejected.
    #[error("session token rejected: {0}")]
    Token(TokenErrorKind),

    /// A stored backup failed its checksum verification.
    #[error("backup {id} failed its integrity check")]
    Integrity {
        /// The backup whose payload did not match its checksum.
        id: Uuid,
    },

    /// No backup exists with the requested id.
    #[error("backup {id} not found")]
    NotFound {
        /// The unknown backup id.
        id: Uuid,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<config::ConfigError> for SecurityError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl SecurityError {
    /// Whether this error is a security denial that must be audited.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied { .. } | Self::AccountLocked { .. } | Self::Token(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenErrorKind::Invalid.to_string(), "invalid");
        assert_eq!(TokenErrorKind::Expired.to_string(), "expired");
        assert_eq!(TokenErrorKind::IdleTimeout.to_string(), "idle-timeout");
    }

    #[test]
    fn test_denial_classification() {
        let locked = SecurityError::AccountLocked { until: Utc::now() };
        assert!(locked.is_denial());

        let missing = SecurityError::NotFound { id: Uuid::new_v4() };
        assert!(!missing.is_denial());
    }
}
