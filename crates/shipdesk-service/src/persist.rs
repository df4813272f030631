//! Durable key-value namespaces backed by JSON files.
//!
//! Each namespace is one pretty-printed JSON file under the store root.
//! The namespace names are part of the external contract: surrounding
//! tooling reads them directly.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use shipdesk_core::SecurityResult;

/// Attempt records, keyed by identity.
pub const NS_ATTEMPTS: &str = "attempts";
/// Identities currently locked out.
pub const NS_LOCKOUTS: &str = "lockouts";
/// The audit event buffer.
pub const NS_EVENTS: &str = "events";
/// The backup collection.
pub const NS_BACKUPS: &str = "backups";
/// The live password policy.
pub const NS_PASSWORD_POLICY: &str = "password-policy";
/// The live backup configuration.
pub const NS_BACKUP_CONFIG: &str = "backup-config";

/// A directory of JSON-serialized namespaces.
#[derive(Debug, Clone)]
pub struct NamespaceStore {
    root: PathBuf,
}

impl NamespaceStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> SecurityResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Reads a namespace, returning `None` if it was never written.
    pub fn read<T: DeserializeOwned>(&self, namespace: &str) -> SecurityResult<Option<T>> {
        let path = self.path(namespace);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Writes a namespace, replacing any previous contents.
    pub fn write<T: Serialize>(&self, namespace: &str, value: &T) -> SecurityResult<()> {
        let path = self.path(namespace);
        std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
        debug!(namespace, "namespace persisted");
        Ok(())
    }

    fn path(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{namespace}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_namespace_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = NamespaceStore::open(dir.path()).unwrap();
        let read: Option<Vec<String>> = store.read(NS_LOCKOUTS).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = NamespaceStore::open(dir.path()).unwrap();
        store
            .write(NS_LOCKOUTS, &vec!["a@b.com".to_string()])
            .unwrap();
        let read: Option<Vec<String>> = store.read(NS_LOCKOUTS).unwrap();
        assert_eq!(read, Some(vec!["a@b.com".to_string()]));
    }
}
