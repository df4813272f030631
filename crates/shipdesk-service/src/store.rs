//! The `SecurityStore` dependency-injection facade.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use shipdesk_audit::{AuditLog, CreateSecurityEvent, SecurityAction, SecurityEvent};
use shipdesk_auth::{
    AccessGate, AttemptOutcome, AttemptRecord, CredentialPolicyEngine, GateSnapshot, LoginOutcome,
    SessionClaims, SessionIssuer, SessionValidator,
};
use shipdesk_core::config::{BackupConfig, PasswordPolicy, SecurityConfig};
use shipdesk_core::{SecurityError, SecurityResult};
use shipdesk_vault::{Backup, StateVault};

use crate::persist::{
    self, NamespaceStore,
};

/// Owns one isolated instance of every security-core component.
///
/// Constructed once at process start and passed by reference to the
/// request-handling layer. Components keep their exclusive ownership of
/// their state; the store wires them together and adds the cross-cutting
/// pieces (token-denial auditing, durable persistence).
pub struct SecurityStore {
    /// Append-only security event log.
    pub audit: Arc<AuditLog>,
    /// Origin allow-listing and attempt/lockout tracking.
    pub gate: Arc<AccessGate>,
    /// Password policy validation and generation.
    pub engine: Arc<CredentialPolicyEngine>,
    /// Session token validation.
    pub sessions: SessionValidator,
    /// Session token issuance for the login flow.
    pub issuer: SessionIssuer,
    /// Backup creation and restore.
    pub vault: Arc<StateVault>,
    persist: Option<NamespaceStore>,
}

impl SecurityStore {
    /// Builds an in-memory store seeded from configuration.
    pub fn new(config: &SecurityConfig) -> Self {
        Self::build(config, None)
    }

    /// Builds a store backed by durable namespaces under `root`.
    ///
    /// Previously persisted state takes precedence over the seed values
    /// in `config`; [`SecurityStore::persist`] writes the live state
    /// back out.
    pub fn open(config: &SecurityConfig, root: &Path) -> SecurityResult<Self> {
        let persist = NamespaceStore::open(root)?;
        let mut config = config.clone();
        if let Some(policy) = persist.read::<PasswordPolicy>(persist::NS_PASSWORD_POLICY)? {
            config.password = policy;
        }
        if let Some(backup) = persist.read::<BackupConfig>(persist::NS_BACKUP_CONFIG)? {
            config.backup = backup;
        }

        let store = Self::build(&config, Some(persist));
        store.load_collections()?;
        info!(root = %root.display(), "security store opened");
        Ok(store)
    }

    fn build(config: &SecurityConfig, persist: Option<NamespaceStore>) -> Self {
        let audit = Arc::new(AuditLog::new(&config.audit));
        let gate = Arc::new(AccessGate::new(&config.access, Arc::clone(&audit)));
        let engine = Arc::new(CredentialPolicyEngine::new(config.password.clone()));
        let vault = Arc::new(StateVault::new(
            config.backup.clone(),
            Arc::clone(&audit),
            Arc::clone(&gate),
            Arc::clone(&engine),
        ));

        Self {
            audit,
            gate,
            engine,
            sessions: SessionValidator::new(&config.session),
            issuer: SessionIssuer::new(&config.session),
            vault,
            persist,
        }
    }

    /// Checks a request origin, surfacing the denial as a typed error.
    ///
    /// The gate itself audits the denial.
    pub fn validate_origin(&self, origin: IpAddr) -> SecurityResult<()> {
        if self.gate.validate_origin(origin) {
            Ok(())
        } else {
            Err(SecurityError::AccessDenied { origin })
        }
    }

    /// Records a login attempt, surfacing a lockout as a typed error.
    pub fn record_attempt(
        &self,
        identity: &str,
        origin: IpAddr,
        outcome: LoginOutcome,
    ) -> SecurityResult<()> {
        match self.gate.record_attempt(identity, origin, outcome) {
            AttemptOutcome::Allowed => Ok(()),
            AttemptOutcome::Locked(until) => Err(SecurityError::AccountLocked { until }),
        }
    }

    /// Replaces the live password policy, auditing the change.
    ///
    /// Collaborators mutate the policy through this operation rather
    /// than [`CredentialPolicyEngine::set_policy`] directly so the
    /// change leaves a trail.
    pub fn update_password_policy(&self, policy: PasswordPolicy) {
        self.engine.set_policy(policy);
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::PasswordPolicyUpdated,
            resource: "password-policy".to_string(),
            origin: None,
            success: true,
            details: None,
        });
    }

    /// Validates a session token, auditing any rejection.
    ///
    /// The validator itself is dependency-free; the store owns both it
    /// and the log, so denial auditing happens here.
    pub fn validate_session(
        &self,
        token: &str,
        origin: Option<IpAddr>,
    ) -> SecurityResult<SessionClaims> {
        match self.sessions.validate(token) {
            Ok(claims) => Ok(claims),
            Err(err) => {
                if let SecurityError::Token(kind) = &err {
                    self.audit.append(CreateSecurityEvent {
                        actor_id: None,
                        actor_email: None,
                        action: SecurityAction::SessionRejected,
                        resource: "admin-session".to_string(),
                        origin,
                        success: false,
                        details: Some(serde_json::json!({ "reason": kind.to_string() })),
                    });
                }
                Err(err)
            }
        }
    }

    /// Writes every durable namespace from live state.
    ///
    /// No-op for in-memory stores.
    pub fn persist(&self) -> SecurityResult<()> {
        let Some(persist) = &self.persist else {
            return Ok(());
        };
        let gate = self.gate.snapshot();
        persist.write(persist::NS_ATTEMPTS, &gate.attempts)?;
        persist.write(persist::NS_LOCKOUTS, &gate.lockouts)?;
        persist.write(persist::NS_EVENTS, &self.audit.snapshot())?;
        persist.write(persist::NS_BACKUPS, &self.vault.snapshot())?;
        persist.write(persist::NS_PASSWORD_POLICY, &self.engine.policy())?;
        persist.write(persist::NS_BACKUP_CONFIG, &self.vault.config())?;
        Ok(())
    }

    fn load_collections(&self) -> SecurityResult<()> {
        let persist = self.persist.as_ref().expect("persistence configured");

        if let Some(events) = persist.read::<Vec<SecurityEvent>>(persist::NS_EVENTS)? {
            self.audit.replace(events);
        }

        let attempts = persist
            .read::<Vec<AttemptRecord>>(persist::NS_ATTEMPTS)?
            .unwrap_or_default();
        let lockouts = persist
            .read::<Vec<String>>(persist::NS_LOCKOUTS)?
            .unwrap_or_default();
        if !attempts.is_empty() || !lockouts.is_empty() {
            self.gate.restore(GateSnapshot { attempts, lockouts });
        }

        if let Some(backups) = persist.read::<Vec<Backup>>(persist::NS_BACKUPS)? {
            self.vault.load(backups);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdesk_core::TokenErrorKind;
    use shipdesk_core::config::BackupKind;

    fn ip() -> IpAddr {
        "203.0.113.9".parse().unwrap()
    }

    #[test]
    fn test_lockout_surfaces_typed_error() {
        let store = SecurityStore::new(&SecurityConfig::default());
        for _ in 0..4 {
            store
                .record_attempt("a@b.com", ip(), LoginOutcome::Failure)
                .unwrap();
        }
        let err = store
            .record_attempt("a@b.com", ip(), LoginOutcome::Failure)
            .unwrap_err();
        assert!(matches!(err, SecurityError::AccountLocked { .. }));
    }

    #[test]
    fn test_session_rejection_is_audited() {
        let store = SecurityStore::new(&SecurityConfig::default());
        let err = store.validate_session("garbage", Some(ip())).unwrap_err();
        assert!(matches!(
            err,
            SecurityError::Token(TokenErrorKind::Invalid)
        ));

        let events = store.audit.query(&shipdesk_audit::EventFilter {
            action: Some(SecurityAction::SessionRejected),
            ..Default::default()
        });
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].details.as_ref().unwrap()["reason"],
            serde_json::json!("invalid")
        );
    }

    #[test]
    fn test_issued_session_validates() {
        let store = SecurityStore::new(&SecurityConfig::default());
        let token = store.issuer.issue("ops@shipdesk.test").unwrap();
        let claims = store.validate_session(&token, None).unwrap();
        assert_eq!(claims.sub, "ops@shipdesk.test");
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = SecurityConfig::default();

        let backup_id = {
            let store = SecurityStore::open(&config, dir.path()).unwrap();
            for _ in 0..5 {
                let _ = store.record_attempt("a@b.com", ip(), LoginOutcome::Failure);
            }
            let backup = store.vault.create_backup(BackupKind::Security).unwrap();
            store.persist().unwrap();
            backup.id
        };

        let reopened = SecurityStore::open(&config, dir.path()).unwrap();
        assert!(reopened.gate.locked_until("a@b.com").is_some());
        assert!(!reopened.audit.is_empty());
        assert!(reopened.vault.list_backups().iter().any(|b| b.id == backup_id));
    }

    #[test]
    fn test_policy_update_is_audited() {
        let store = SecurityStore::new(&SecurityConfig::default());
        store.update_password_policy(PasswordPolicy {
            min_length: 20,
            ..PasswordPolicy::default()
        });
        assert_eq!(store.engine.policy().min_length, 20);

        let events = store.audit.query(&shipdesk_audit::EventFilter {
            action: Some(SecurityAction::PasswordPolicyUpdated),
            ..Default::default()
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource, "password-policy");
        assert!(events[0].success);
    }

    #[test]
    fn test_persisted_policy_overrides_seed() {
        let dir = tempfile::tempdir().unwrap();
        let config = SecurityConfig::default();

        {
            let store = SecurityStore::open(&config, dir.path()).unwrap();
            store.engine.set_policy(PasswordPolicy {
                min_length: 14,
                ..PasswordPolicy::default()
            });
            store.persist().unwrap();
        }

        let reopened = SecurityStore::open(&config, dir.path()).unwrap();
        assert_eq!(reopened.engine.policy().min_length, 14);
    }
}
