//! Backup entity model and snapshot payload shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shipdesk_audit::SecurityEvent;
use shipdesk_auth::GateSnapshot;
use shipdesk_core::config::{BackupConfig, BackupKind, PasswordPolicy};

/// A stored point-in-time snapshot.
///
/// `payload` is the base64 encoding of the post-transform snapshot bytes;
/// `checksum` is the lowercase-hex SHA-256 digest of those same bytes, so
/// any single-byte corruption is detected before a restore touches live
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    /// Unique backup identifier.
    pub id: Uuid,
    /// When the backup was created.
    pub timestamp: DateTime<Utc>,
    /// Which state subset the backup captures.
    pub kind: BackupKind,
    /// Base64-encoded post-transform snapshot bytes.
    pub payload: String,
    /// Lowercase-hex SHA-256 over the post-transform bytes.
    pub checksum: String,
    /// Size of the post-transform payload in bytes.
    pub size: u64,
}

/// The configuration subset captured by `config` backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// The credential policy engine's live policy.
    pub password_policy: PasswordPolicy,
    /// The vault's live backup configuration.
    pub backup_config: BackupConfig,
}

/// The security subset captured by `security` backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySnapshot {
    /// Full audit log buffer, oldest first.
    pub events: Vec<SecurityEvent>,
    /// Attempt records and lockouts from the access gate.
    pub gate: GateSnapshot,
}

/// Everything a backup payload can carry.
///
/// The populated fields depend on the backup kind; `full` populates all
/// three. Restore replaces each populated subset wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Collaborator-owned credential/session-adjacent state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<serde_json::Value>,
    /// Security-core configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSnapshot>,
    /// Audit and gate state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecuritySnapshot>,
}
