//! Password policy configuration.

use serde::{Deserialize, Serialize};

/// Rules a new admin credential must satisfy.
///
/// This is a mutable runtime singleton owned by the credential policy
/// engine; the configuration section only provides its initial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Require at least one uppercase letter.
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one lowercase letter.
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    /// Require at least one digit.
    #[serde(default = "default_true")]
    pub require_numbers: bool,
    /// Require at least one special character.
    #[serde(default = "default_true")]
    pub require_special_chars: bool,
    /// Reject passwords found on the common-password denylist.
    #[serde(default = "default_true")]
    pub prevent_common_passwords: bool,
    /// Reject passwords containing the user's name or email local-part.
    #[serde(default = "default_true")]
    pub prevent_user_info: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_special_chars: true,
            prevent_common_passwords: true,
            prevent_user_info: true,
        }
    }
}

fn default_min_length() -> usize {
    8
}

fn default_max_length() -> usize {
    128
}

fn default_true() -> bool {
    true
}
