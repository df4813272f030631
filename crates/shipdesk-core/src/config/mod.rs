//! Security-core configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. The repository historically carried two divergent policy
//! objects (`SECURITY_CONFIG` and `ADMIN_SECURITY_CONFIG`); this schema
//! unifies them into a single [`SecurityConfig`].

pub mod access;
pub mod audit;
pub mod backup;
pub mod logging;
pub mod password;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::access::AccessConfig;
pub use self::audit::AuditConfig;
pub use self::backup::{BackupConfig, BackupKind};
pub use self::logging::LoggingConfig;
pub use self::password::PasswordPolicy;
pub use self::session::SessionConfig;

use crate::error::SecurityError;

/// Root configuration for the admin security core.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Origin allow-listing and login-attempt settings.
    #[serde(default)]
    pub access: AccessConfig,
    /// Initial password policy. Mutable at runtime through the
    /// credential policy engine; this section only seeds it.
    #[serde(default)]
    pub password: PasswordPolicy,
    /// Session token settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Initial backup configuration. Mutable at runtime through the
    /// state vault; this section only seeds it.
    #[serde(default)]
    pub backup: BackupConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SecurityConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific
    /// overlay and environment variables prefixed with `SHIPDESK_`.
    pub fn load(env: &str) -> Result<Self, SecurityError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SHIPDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_complete() {
        let config = SecurityConfig::default();
        assert_eq!(config.access.max_attempts, 5);
        assert_eq!(config.audit.capacity, 1000);
        assert!(config.password.require_uppercase);
    }
}
