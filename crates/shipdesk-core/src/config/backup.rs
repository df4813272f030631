//! Backup retention and scheduling configuration.

use serde::{Deserialize, Serialize};

/// Which slice of system state a backup captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupKind {
    /// Union of users, config, and security.
    Full,
    /// Credential- and session-adjacent collaborator state.
    Users,
    /// Password policy and backup configuration.
    Config,
    /// Audit log export plus attempt/lockout snapshot.
    Security,
}

impl std::fmt::Display for BackupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Users => write!(f, "users"),
            Self::Config => write!(f, "config"),
            Self::Security => write!(f, "security"),
        }
    }
}

/// State vault configuration.
///
/// A mutable runtime singleton owned by the state vault; the
/// configuration section only provides its initial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Whether scheduled backups are enabled.
    #[serde(default = "default_true")]
    pub auto_backup_enabled: bool,
    /// Hours between scheduled backups.
    #[serde(default = "default_interval")]
    pub interval_hours: u64,
    /// Maximum number of retained backups across all kinds; the oldest
    /// by timestamp is evicted first.
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
    /// Which kinds the scheduler captures.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<BackupKind>,
    /// Whether the compression stage is applied to new backups.
    #[serde(default)]
    pub compression_enabled: bool,
    /// Whether the encryption stage is applied to new backups.
    #[serde(default)]
    pub encryption_enabled: bool,
    /// Where exported backup files are written.
    #[serde(default = "default_storage_target")]
    pub storage_target: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            auto_backup_enabled: true,
            interval_hours: default_interval(),
            max_backups: default_max_backups(),
            kinds: default_kinds(),
            compression_enabled: false,
            encryption_enabled: false,
            storage_target: default_storage_target(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    24
}

fn default_max_backups() -> usize {
    10
}

fn default_kinds() -> Vec<BackupKind> {
    vec![BackupKind::Full]
}

fn default_storage_target() -> String {
    "data/backups".to_string()
}
