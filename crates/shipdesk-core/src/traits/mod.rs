//! Capability traits implemented by downstream crates.

pub mod state;
pub mod transform;

pub use state::{CollaboratorState, NullCollaborator};
pub use transform::{Cipher, Compressor};
