//! Hook for snapshotting state owned by external collaborators.

use crate::result::SecurityResult;

/// State owned outside the security core that `users` backups capture.
///
/// The surrounding application (user CRUD, login flow) implements this to
/// expose its credential- and session-adjacent records to the state vault.
/// Restore replaces the collaborator's state wholesale; partial restores
/// are not supported.
pub trait CollaboratorState: Send + Sync {
    /// Serializes the collaborator state subset included in `users` backups.
    fn export(&self) -> SecurityResult<serde_json::Value>;

    /// Replaces the collaborator state with a previously exported snapshot.
    fn restore(&self, snapshot: &serde_json::Value) -> SecurityResult<()>;
}

/// Default collaborator used when the host registers nothing.
///
/// Exports an empty object and accepts any snapshot without effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCollaborator;

impl CollaboratorState for NullCollaborator {
    fn export(&self) -> SecurityResult<serde_json::Value> {
        Ok(serde_json::json!({}))
    }

    fn restore(&self, _snapshot: &serde_json::Value) -> SecurityResult<()> {
        Ok(())
    }
}
