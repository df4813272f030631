//! Security event entity model.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of security-relevant decision an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityAction {
    /// A login attempt succeeded.
    LoginSuccess,
    /// A login attempt failed (wrong credentials).
    LoginFailed,
    /// A login attempt was rejected because the identity is locked.
    LoginAttemptLocked,
    /// An identity crossed the failure threshold and was locked out.
    AccountLocked,
    /// A request origin was rejected by the allow-list.
    IpAccessDenied,
    /// A session token was rejected.
    SessionRejected,
    /// The password policy was replaced.
    PasswordPolicyUpdated,
    /// The backup configuration was replaced.
    BackupConfigUpdated,
    /// A backup was created.
    BackupCreated,
    /// A backup was restored into live state.
    BackupRestored,
    /// A backup was deleted.
    BackupDeleted,
    /// A backup was exported to a file.
    BackupExported,
    /// A backup was imported from a file.
    BackupImported,
}

impl std::fmt::Display for SecurityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::LoginAttemptLocked => "LOGIN_ATTEMPT_LOCKED",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::IpAccessDenied => "IP_ACCESS_DENIED",
            Self::SessionRejected => "SESSION_REJECTED",
            Self::PasswordPolicyUpdated => "PASSWORD_POLICY_UPDATED",
            Self::BackupConfigUpdated => "BACKUP_CONFIG_UPDATED",
            Self::BackupCreated => "BACKUP_CREATED",
            Self::BackupRestored => "BACKUP_RESTORED",
            Self::BackupDeleted => "BACKUP_DELETED",
            Self::BackupExported => "BACKUP_EXPORTED",
            Self::BackupImported => "BACKUP_IMPORTED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SecurityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOGIN_SUCCESS" => Ok(Self::LoginSuccess),
            "LOGIN_FAILED" => Ok(Self::LoginFailed),
            "LOGIN_ATTEMPT_LOCKED" => Ok(Self::LoginAttemptLocked),
            "ACCOUNT_LOCKED" => Ok(Self::AccountLocked),
            "IP_ACCESS_DENIED" => Ok(Self::IpAccessDenied),
            "SESSION_REJECTED" => Ok(Self::SessionRejected),
            "PASSWORD_POLICY_UPDATED" => Ok(Self::PasswordPolicyUpdated),
            "BACKUP_CONFIG_UPDATED" => Ok(Self::BackupConfigUpdated),
            "BACKUP_CREATED" => Ok(Self::BackupCreated),
            "BACKUP_RESTORED" => Ok(Self::BackupRestored),
            "BACKUP_DELETED" => Ok(Self::BackupDeleted),
            "BACKUP_EXPORTED" => Ok(Self::BackupExported),
            "BACKUP_IMPORTED" => Ok(Self::BackupImported),
            other => Err(format!("unknown security action: {other}")),
        }
    }
}

/// An immutable security event recording one gate or vault decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Internal id of the acting identity, if known.
    pub actor_id: Option<Uuid>,
    /// Email of the acting identity, if known.
    pub actor_email: Option<String>,
    /// The decision that was recorded.
    pub action: SecurityAction,
    /// The resource the decision concerned (e.g. `"admin-login"`, a backup id).
    pub resource: String,
    /// Source address of the actor.
    pub origin: Option<IpAddr>,
    /// Whether the action was permitted.
    pub success: bool,
    /// Additional details about the decision (JSON).
    pub details: Option<serde_json::Value>,
}

/// Data required to append a new security event.
///
/// Id and timestamp are assigned by the log at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecurityEvent {
    /// Internal id of the acting identity.
    pub actor_id: Option<Uuid>,
    /// Email of the acting identity.
    pub actor_email: Option<String>,
    /// The decision being recorded.
    pub action: SecurityAction,
    /// The resource the decision concerned.
    pub resource: String,
    /// Source address of the actor.
    pub origin: Option<IpAddr>,
    /// Whether the action was permitted.
    pub success: bool,
    /// Additional details (JSON).
    pub details: Option<serde_json::Value>,
}

impl CreateSecurityEvent {
    /// Shorthand for an anonymous denial event with no details.
    pub fn denial(action: SecurityAction, resource: impl Into<String>, origin: IpAddr) -> Self {
        Self {
            actor_id: None,
            actor_email: None,
            action,
            resource: resource.into(),
            origin: Some(origin),
            success: false,
            details: None,
        }
    }
}
