//! Payload transform stages applied to backup payloads.
//!
//! Compression and encryption are explicit capabilities rather than
//! silently-ignored flags: the vault always runs both stages, and a
//! deployment that enables the corresponding flag must supply a real
//! implementation. The default implementations are identity transforms.

use crate::result::SecurityResult;

/// Compresses backup payloads before checksumming and storage.
pub trait Compressor: Send + Sync {
    /// Short identifier recorded for diagnostics (e.g. `"noop"`, `"gzip"`).
    fn name(&self) -> &str;

    /// Compresses a serialized snapshot.
    fn compress(&self, data: &[u8]) -> SecurityResult<Vec<u8>>;

    /// Reverses [`Compressor::compress`].
    fn decompress(&self, data: &[u8]) -> SecurityResult<Vec<u8>>;
}

/// Encrypts backup payloads after compression.
pub trait Cipher: Send + Sync {
    /// Short identifier recorded for diagnostics (e.g. `"noop"`, `"aes-gcm"`).
    fn name(&self) -> &str;

    /// Encrypts a (possibly compressed) payload.
    fn encrypt(&self, data: &[u8]) -> SecurityResult<Vec<u8>>;

    /// Reverses [`Cipher::encrypt`].
    fn decrypt(&self, data: &[u8]) -> SecurityResult<Vec<u8>>;
}
