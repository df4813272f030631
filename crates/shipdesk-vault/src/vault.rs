//! Backup creation, integrity-checked restore, and retention.

use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use shipdesk_audit::{AuditLog, CreateSecurityEvent, SecurityAction};
use shipdesk_auth::{AccessGate, CredentialPolicyEngine};
use shipdesk_core::config::{BackupConfig, BackupKind};
use shipdesk_core::traits::{Cipher, CollaboratorState, Compressor, NullCollaborator};
use shipdesk_core::{SecurityError, SecurityResult};

use crate::backup::{Backup, ConfigSnapshot, SecuritySnapshot, SnapshotPayload};
use crate::transform::{NoopCipher, NoopCompressor};

#[derive(Debug)]
struct VaultState {
    backups: Vec<Backup>,
    config: BackupConfig,
}

/// Creates and restores checksummed snapshots of core and collaborator
/// state.
///
/// The backup collection and its configuration share one mutex; a
/// second mutex serializes restore against backup creation end to end,
/// so a snapshot can never be gathered while live state is
/// mid-replacement. Restore is all-or-nothing: the payload is
/// checksum-verified and fully deserialized before any live state is
/// replaced.
pub struct StateVault {
    state: Mutex<VaultState>,
    // Held across create_backup's gather+insert and restore's
    // verify+apply. Lock order: ops before state.
    ops: Mutex<()>,
    audit: Arc<AuditLog>,
    gate: Arc<AccessGate>,
    engine: Arc<CredentialPolicyEngine>,
    collaborator: Arc<dyn CollaboratorState>,
    compressor: Arc<dyn Compressor>,
    cipher: Arc<dyn Cipher>,
}

impl std::fmt::Debug for StateVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateVault")
            .field("compressor", &self.compressor.name())
            .field("cipher", &self.cipher.name())
            .finish()
    }
}

impl StateVault {
    /// Creates a vault with identity transforms and no collaborator.
    pub fn new(
        config: BackupConfig,
        audit: Arc<AuditLog>,
        gate: Arc<AccessGate>,
        engine: Arc<CredentialPolicyEngine>,
    ) -> Self {
        Self {
            state: Mutex::new(VaultState {
                backups: Vec::new(),
                config,
            }),
            ops: Mutex::new(()),
            audit,
            gate,
            engine,
            collaborator: Arc::new(NullCollaborator),
            compressor: Arc::new(NoopCompressor),
            cipher: Arc::new(NoopCipher),
        }
    }

    /// Registers the host's collaborator-state hook for `users` backups.
    pub fn with_collaborator(mut self, collaborator: Arc<dyn CollaboratorState>) -> Self {
        self.collaborator = collaborator;
        self
    }

    /// Installs real transform stages in place of the identity defaults.
    pub fn with_transforms(
        mut self,
        compressor: Arc<dyn Compressor>,
        cipher: Arc<dyn Cipher>,
    ) -> Self {
        self.compressor = compressor;
        self.cipher = cipher;
        self
    }

    /// Returns a copy of the current backup configuration.
    pub fn config(&self) -> BackupConfig {
        self.state.lock().expect("vault state poisoned").config.clone()
    }

    /// Replaces the backup configuration and applies its retention limit.
    pub fn set_config(&self, config: BackupConfig) {
        let mut state = self.state.lock().expect("vault state poisoned");
        state.config = config;
        Self::apply_retention(&mut state);
        drop(state);
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::BackupConfigUpdated,
            resource: "backup-config".to_string(),
            origin: None,
            success: true,
            details: None,
        });
    }

    /// Gathers the state subset for `kind`, runs the transform stages,
    /// and stores a checksummed backup, evicting the oldest backup by
    /// timestamp if the retention limit is exceeded.
    pub fn create_backup(&self, kind: BackupKind) -> SecurityResult<Backup> {
        let _ops = self.ops.lock().expect("vault ops poisoned");
        let payload = self.gather(kind)?;
        let serialized = serde_json::to_vec(&payload)?;
        let compressed = self.compressor.compress(&serialized)?;
        let transformed = self.cipher.encrypt(&compressed)?;

        let backup = Backup {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            checksum: checksum(&transformed),
            size: transformed.len() as u64,
            payload: BASE64.encode(&transformed),
        };

        let mut state = self.state.lock().expect("vault state poisoned");
        state.backups.push(backup.clone());
        Self::apply_retention(&mut state);
        drop(state);

        info!(id = %backup.id, kind = %kind, size = backup.size, "backup created");
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::BackupCreated,
            resource: backup.id.to_string(),
            origin: None,
            success: true,
            details: Some(serde_json::json!({ "kind": kind, "size": backup.size })),
        });
        Ok(backup)
    }

    /// Verifies and applies the backup with the given id.
    ///
    /// Fails with [`SecurityError::NotFound`] for an unknown id and with
    /// [`SecurityError::Integrity`] if the stored payload does not match
    /// its checksum; in both cases no live state changes.
    pub fn restore(&self, id: Uuid) -> SecurityResult<()> {
        let _ops = self.ops.lock().expect("vault ops poisoned");
        let state = self.state.lock().expect("vault state poisoned");
        let backup = state
            .backups
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(SecurityError::NotFound { id })?;
        drop(state);

        let transformed = verify(&backup)?;
        let compressed = self.cipher.decrypt(&transformed)?;
        let serialized = self.compressor.decompress(&compressed)?;
        let payload: SnapshotPayload = serde_json::from_slice(&serialized)?;

        // Collaborator restore is the only fallible application, so it
        // runs first; the wholesale replacements below cannot fail.
        if let Some(users) = &payload.users {
            self.collaborator.restore(users)?;
        }
        if let Some(config) = payload.config {
            self.engine.set_policy(config.password_policy);
            let mut state = self.state.lock().expect("vault state poisoned");
            state.config = config.backup_config;
        }
        if let Some(security) = payload.security {
            self.audit.replace(security.events);
            self.gate.restore(security.gate);
        }

        info!(id = %backup.id, kind = %backup.kind, "backup restored");
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::BackupRestored,
            resource: backup.id.to_string(),
            origin: None,
            success: true,
            details: Some(serde_json::json!({ "kind": backup.kind })),
        });
        Ok(())
    }

    /// Returns all retained backups, newest first.
    pub fn list_backups(&self) -> Vec<Backup> {
        let state = self.state.lock().expect("vault state poisoned");
        let mut backups = state.backups.clone();
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        backups
    }

    /// Removes the backup with the given id.
    pub fn delete_backup(&self, id: Uuid) -> SecurityResult<()> {
        let mut state = self.state.lock().expect("vault state poisoned");
        let before = state.backups.len();
        state.backups.retain(|b| b.id != id);
        if state.backups.len() == before {
            return Err(SecurityError::NotFound { id });
        }
        drop(state);
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::BackupDeleted,
            resource: id.to_string(),
            origin: None,
            success: true,
            details: None,
        });
        Ok(())
    }

    /// Serializes the backup with the given id to a JSON file.
    pub fn export_to_file(&self, id: Uuid, path: &Path) -> SecurityResult<()> {
        let state = self.state.lock().expect("vault state poisoned");
        let backup = state
            .backups
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(SecurityError::NotFound { id })?;
        drop(state);

        std::fs::write(path, serde_json::to_string_pretty(&backup)?)?;
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::BackupExported,
            resource: id.to_string(),
            origin: None,
            success: true,
            details: Some(serde_json::json!({ "path": path.display().to_string() })),
        });
        Ok(())
    }

    /// Reads a backup from a JSON file, re-validating shape and checksum
    /// before inserting it under the usual retention rule.
    pub fn import_from_file(&self, path: &Path) -> SecurityResult<Backup> {
        let raw = std::fs::read_to_string(path)?;
        let backup: Backup = serde_json::from_str(&raw)?;
        verify(&backup)?;

        let mut state = self.state.lock().expect("vault state poisoned");
        if state.backups.iter().any(|b| b.id == backup.id) {
            warn!(id = %backup.id, "imported backup replaces an existing id");
            state.backups.retain(|b| b.id != backup.id);
        }
        state.backups.push(backup.clone());
        Self::apply_retention(&mut state);
        drop(state);

        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: None,
            action: SecurityAction::BackupImported,
            resource: backup.id.to_string(),
            origin: None,
            success: true,
            details: Some(serde_json::json!({ "path": path.display().to_string() })),
        });
        Ok(backup)
    }

    /// Copies the backup collection for persistence, oldest first.
    pub fn snapshot(&self) -> Vec<Backup> {
        let state = self.state.lock().expect("vault state poisoned");
        let mut backups = state.backups.clone();
        backups.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        backups
    }

    /// Replaces the backup collection wholesale from persisted state.
    pub fn load(&self, backups: Vec<Backup>) {
        let mut state = self.state.lock().expect("vault state poisoned");
        state.backups = backups;
        Self::apply_retention(&mut state);
    }

    fn gather(&self, kind: BackupKind) -> SecurityResult<SnapshotPayload> {
        let mut payload = SnapshotPayload::default();
        if matches!(kind, BackupKind::Full | BackupKind::Users) {
            payload.users = Some(self.collaborator.export()?);
        }
        if matches!(kind, BackupKind::Full | BackupKind::Config) {
            payload.config = Some(ConfigSnapshot {
                password_policy: self.engine.policy(),
                backup_config: self.config(),
            });
        }
        if matches!(kind, BackupKind::Full | BackupKind::Security) {
            payload.security = Some(SecuritySnapshot {
                events: self.audit.snapshot(),
                gate: self.gate.snapshot(),
            });
        }
        Ok(payload)
    }

    fn apply_retention(state: &mut VaultState) {
        while state.backups.len() > state.config.max_backups {
            let Some(oldest) = state
                .backups
                .iter()
                .enumerate()
                .min_by_key(|(_, b)| b.timestamp)
                .map(|(i, _)| i)
            else {
                break;
            };
            let evicted = state.backups.remove(oldest);
            info!(id = %evicted.id, "backup evicted by retention policy");
        }
    }
}

/// Decodes a backup payload and checks it against the stored checksum.
///
/// Any decode failure or digest mismatch is an integrity violation.
fn verify(backup: &Backup) -> SecurityResult<Vec<u8>> {
    let bytes = BASE64
        .decode(&backup.payload)
        .map_err(|_| SecurityError::Integrity { id: backup.id })?;
    if checksum(&bytes) != backup.checksum {
        return Err(SecurityError::Integrity { id: backup.id });
    }
    Ok(bytes)
}

fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use shipdesk_auth::LoginOutcome;
    use shipdesk_core::config::{AccessConfig, AuditConfig, PasswordPolicy};

    fn make_vault(max_backups: usize) -> StateVault {
        let audit = Arc::new(AuditLog::new(&AuditConfig::default()));
        let gate = Arc::new(AccessGate::new(&AccessConfig::default(), Arc::clone(&audit)));
        let engine = Arc::new(CredentialPolicyEngine::new(PasswordPolicy::default()));
        let config = BackupConfig {
            max_backups,
            ..BackupConfig::default()
        };
        StateVault::new(config, audit, gate, engine)
    }

    fn fail_once(vault: &StateVault, identity: &str) {
        vault
            .gate
            .record_attempt(identity, "10.0.0.1".parse().unwrap(), LoginOutcome::Failure);
    }

    #[test]
    fn test_security_backup_round_trip() {
        let vault = make_vault(10);
        fail_once(&vault, "a@b.com");
        fail_once(&vault, "a@b.com");
        let pre = vault.gate.snapshot();

        let backup = vault.create_backup(BackupKind::Security).unwrap();

        // Mutate live state, then restore.
        fail_once(&vault, "c@d.com");
        assert_ne!(vault.gate.snapshot(), pre);
        vault.restore(backup.id).unwrap();
        assert_eq!(vault.gate.snapshot(), pre);
    }

    #[test]
    fn test_config_backup_round_trip() {
        let vault = make_vault(10);
        let backup = vault.create_backup(BackupKind::Config).unwrap();

        vault.engine.set_policy(PasswordPolicy {
            min_length: 40,
            ..PasswordPolicy::default()
        });
        vault.restore(backup.id).unwrap();
        assert_eq!(vault.engine.policy(), PasswordPolicy::default());
    }

    #[test]
    fn test_tampered_payload_aborts_restore() {
        let vault = make_vault(10);
        fail_once(&vault, "a@b.com");
        let backup = vault.create_backup(BackupKind::Security).unwrap();
        let pre = vault.gate.snapshot();

        // Flip one byte of the stored payload.
        {
            let mut state = vault.state.lock().unwrap();
            let stored = state.backups.iter_mut().find(|b| b.id == backup.id).unwrap();
            let mut bytes = BASE64.decode(&stored.payload).unwrap();
            bytes[0] ^= 0x01;
            stored.payload = BASE64.encode(&bytes);
        }

        let err = vault.restore(backup.id).unwrap_err();
        assert!(matches!(err, SecurityError::Integrity { id } if id == backup.id));
        assert_eq!(vault.gate.snapshot(), pre);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let vault = make_vault(10);
        let id = Uuid::new_v4();
        assert!(matches!(
            vault.restore(id).unwrap_err(),
            SecurityError::NotFound { .. }
        ));
        assert!(matches!(
            vault.delete_backup(id).unwrap_err(),
            SecurityError::NotFound { .. }
        ));
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let vault = make_vault(3);
        let first = vault.create_backup(BackupKind::Config).unwrap();
        for _ in 0..3 {
            vault.create_backup(BackupKind::Config).unwrap();
        }
        let retained = vault.list_backups();
        assert_eq!(retained.len(), 3);
        assert!(retained.iter().all(|b| b.id != first.id));
    }

    #[test]
    fn test_delete_backup() {
        let vault = make_vault(10);
        let backup = vault.create_backup(BackupKind::Full).unwrap();
        vault.delete_backup(backup.id).unwrap();
        assert!(vault.list_backups().is_empty());
    }

    #[test]
    fn test_file_export_import_round_trip() {
        let vault = make_vault(10);
        fail_once(&vault, "a@b.com");
        let backup = vault.create_backup(BackupKind::Full).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        vault.export_to_file(backup.id, &path).unwrap();

        let other = make_vault(10);
        let imported = other.import_from_file(&path).unwrap();
        assert_eq!(imported, backup);
        other.restore(imported.id).unwrap();
    }

    #[test]
    fn test_import_rejects_tampered_file() {
        let vault = make_vault(10);
        let backup = vault.create_backup(BackupKind::Config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        vault.export_to_file(backup.id, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let mut parsed: Backup = serde_json::from_str(&raw).unwrap();
        parsed.checksum = format!("{:x}", Sha256::digest(b"someone else's bytes"));
        std::fs::write(&path, serde_json::to_string_pretty(&parsed).unwrap()).unwrap();

        let other = make_vault(10);
        assert!(matches!(
            other.import_from_file(&path).unwrap_err(),
            SecurityError::Integrity { .. }
        ));
        assert!(other.list_backups().is_empty());
    }

    /// Pass-through compressor whose decompress stage parks until told
    /// to continue, pinning a restore mid-application.
    struct GatedCompressor {
        entered: mpsc::Sender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Compressor for GatedCompressor {
        fn name(&self) -> &str {
            "gated"
        }

        fn compress(&self, data: &[u8]) -> SecurityResult<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn decompress(&self, data: &[u8]) -> SecurityResult<Vec<u8>> {
            self.entered.send(()).ok();
            let _ = self.release.lock().unwrap().recv();
            Ok(data.to_vec())
        }
    }

    #[test]
    fn test_restore_blocks_concurrent_backup_creation() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let vault = Arc::new(make_vault(10).with_transforms(
            Arc::new(GatedCompressor {
                entered: entered_tx,
                release: Mutex::new(release_rx),
            }),
            Arc::new(NoopCipher),
        ));
        let backup = vault.create_backup(BackupKind::Security).unwrap();

        let restoring = {
            let vault = Arc::clone(&vault);
            let id = backup.id;
            thread::spawn(move || vault.restore(id))
        };
        // Wait until the restore is parked between checksum verification
        // and state application.
        entered_rx.recv().unwrap();

        let (created_tx, created_rx) = mpsc::channel();
        let creating = {
            let vault = Arc::clone(&vault);
            thread::spawn(move || {
                let result = vault.create_backup(BackupKind::Security);
                created_tx.send(()).ok();
                result
            })
        };
        // The in-flight restore must hold off the snapshot gather.
        assert!(
            created_rx
                .recv_timeout(Duration::from_millis(100))
                .is_err()
        );

        release_tx.send(()).unwrap();
        restoring.join().unwrap().unwrap();
        creating.join().unwrap().unwrap();
    }

    #[test]
    fn test_backup_audited() {
        let vault = make_vault(10);
        let backup = vault.create_backup(BackupKind::Security).unwrap();
        vault.restore(backup.id).unwrap();

        let events = vault.audit.query(&shipdesk_audit::EventFilter {
            action: Some(SecurityAction::BackupRestored),
            ..Default::default()
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource, backup.id.to_string());
    }
}
