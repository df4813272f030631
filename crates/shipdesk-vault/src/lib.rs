//! # shipdesk-vault
//!
//! Creates and restores checksummed point-in-time snapshots of the
//! security core's configuration and of external collaborator state.
//! Any checksum mismatch aborts a restore before any live state changes.

pub mod backup;
pub mod transform;
pub mod vault;

pub use backup::{Backup, ConfigSnapshot, SecuritySnapshot, SnapshotPayload};
pub use transform::{NoopCipher, NoopCompressor};
pub use vault::StateVault;
