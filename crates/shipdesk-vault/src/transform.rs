//! Identity transform stages.
//!
//! The vault runs every payload through its installed [`Compressor`] and
//! [`Cipher`]; these defaults make both stages a pass-through. Deployments
//! that enable `compression_enabled`/`encryption_enabled` install real
//! implementations at construction time.

use shipdesk_core::SecurityResult;
use shipdesk_core::traits::{Cipher, Compressor};

/// Pass-through compressor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompressor;

impl Compressor for NoopCompressor {
    fn name(&self) -> &str {
        "noop"
    }

    fn compress(&self, data: &[u8]) -> SecurityResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> SecurityResult<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Pass-through cipher.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCipher;

impl Cipher for NoopCipher {
    fn name(&self) -> &str {
        "noop"
    }

    fn encrypt(&self, data: &[u8]) -> SecurityResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decrypt(&self, data: &[u8]) -> SecurityResult<Vec<u8>> {
        Ok(data.to_vec())
    }
}
