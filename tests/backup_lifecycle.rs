//! Backup lifecycle through the security store: create, restore,
//! export/import, tamper detection.

use std::net::IpAddr;

use shipdesk_core::SecurityError;
use shipdesk_core::config::{BackupKind, PasswordPolicy, SecurityConfig};
use shipdesk_service::SecurityStore;

fn ip() -> IpAddr {
    "192.0.2.4".parse().unwrap()
}

#[test]
fn restore_rolls_config_back() {
    let store = SecurityStore::new(&SecurityConfig::default());
    let backup = store.vault.create_backup(BackupKind::Config).unwrap();

    store.engine.set_policy(PasswordPolicy {
        min_length: 20,
        ..PasswordPolicy::default()
    });
    assert_eq!(store.engine.policy().min_length, 20);

    store.vault.restore(backup.id).unwrap();
    assert_eq!(store.engine.policy().min_length, 8);
}

#[test]
fn export_import_round_trips_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("security.json");

    let source = SecurityStore::new(&SecurityConfig::default());
    let _ = source.record_attempt(
        "ops@shipdesk.test",
        ip(),
        shipdesk_auth::LoginOutcome::Failure,
    );
    let backup = source.vault.create_backup(BackupKind::Security).unwrap();
    source.vault.export_to_file(backup.id, &path).unwrap();

    let target = SecurityStore::new(&SecurityConfig::default());
    let imported = target.vault.import_from_file(&path).unwrap();
    assert_eq!(imported.id, backup.id);
    assert_eq!(imported.checksum, backup.checksum);

    target.vault.restore(imported.id).unwrap();
    let snapshot = target.gate.snapshot();
    assert_eq!(snapshot.attempts.len(), 1);
    assert_eq!(snapshot.attempts[0].identity, "ops@shipdesk.test");
}

#[test]
fn tampered_import_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("security.json");

    let source = SecurityStore::new(&SecurityConfig::default());
    let backup = source.vault.create_backup(BackupKind::Full).unwrap();
    source.vault.export_to_file(backup.id, &path).unwrap();

    // Swap the checksum for a bogus one; the import must be refused
    // before any state is touched.
    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["checksum"] = serde_json::json!("0".repeat(64));
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let target = SecurityStore::new(&SecurityConfig::default());
    let err = target.vault.import_from_file(&path).unwrap_err();
    assert!(matches!(err, SecurityError::Integrity { .. }));
    assert!(target.vault.list_backups().is_empty());
}

#[test]
fn retention_evicts_oldest_backup() {
    let mut config = SecurityConfig::default();
    config.backup.max_backups = 2;
    let store = SecurityStore::new(&config);

    let first = store.vault.create_backup(BackupKind::Config).unwrap();
    store.vault.create_backup(BackupKind::Config).unwrap();
    store.vault.create_backup(BackupKind::Config).unwrap();

    let backups = store.vault.list_backups();
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|b| b.id != first.id));
}
