//! Convenience result type alias for the security core.

use crate::error::SecurityError;

/// A specialized `Result` type for security-core operations.
///
/// Defined as a convenience so that every crate does not need to write
/// `Result<T, SecurityError>` explicitly.
pub type SecurityResult<T> = Result<T, SecurityError>;
