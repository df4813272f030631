//! Password policy validation and deterministic strength scoring.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use shipdesk_core::config::PasswordPolicy;

use super::generator;

/// Passwords rejected outright when the denylist check is enabled.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "123456", "12345678", "123456789",
    "qwerty", "qwerty123", "abc123", "letmein", "welcome", "welcome1",
    "admin", "admin123", "root", "changeme", "iloveyou", "monkey",
    "dragon", "sunshine", "princess", "football", "master", "shadow",
];

/// Fixed rule weights; the total is capped at 100.
const WEIGHT_MIN_LENGTH: u8 = 20;
const WEIGHT_UPPERCASE: u8 = 15;
const WEIGHT_LOWERCASE: u8 = 15;
const WEIGHT_DIGIT: u8 = 15;
const WEIGHT_SPECIAL: u8 = 15;
const WEIGHT_NOT_COMMON: u8 = 10;
const WEIGHT_NOT_USER_INFO: u8 = 10;
const BONUS_LENGTH_12: u8 = 10;
const BONUS_LENGTH_16: u8 = 5;
const BONUS_ALL_CLASSES: u8 = 10;

/// Strength band derived from the 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordStrength {
    /// Score below 40.
    Weak,
    /// Score below 60.
    Medium,
    /// Score below 80.
    Strong,
    /// Score 80 and above.
    VeryStrong,
}

impl PasswordStrength {
    fn from_score(score: u8) -> Self {
        match score {
            0..40 => Self::Weak,
            40..60 => Self::Medium,
            60..80 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Strong => write!(f, "strong"),
            Self::VeryStrong => write!(f, "very-strong"),
        }
    }
}

/// Identity attributes a password must not contain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    /// The user's first name.
    pub first_name: Option<String>,
    /// The user's last name.
    pub last_name: Option<String>,
    /// The user's email address; only the local part is checked.
    pub email: Option<String>,
}

impl UserInfo {
    /// Lowercased fragments the password may not contain.
    fn fragments(&self) -> Vec<String> {
        let mut fragments = Vec::new();
        if let Some(first) = &self.first_name
            && !first.is_empty()
        {
            fragments.push(first.to_lowercase());
        }
        if let Some(last) = &self.last_name
            && !last.is_empty()
        {
            fragments.push(last.to_lowercase());
        }
        if let Some(email) = &self.email
            && let Some(local) = email.split('@').next()
            && !local.is_empty()
        {
            fragments.push(local.to_lowercase());
        }
        fragments
    }
}

/// Outcome of validating one password.
///
/// Violations are returned as data, not as an error, so a caller can
/// render every problem at once. `is_valid` depends only on `errors`
/// being empty, never on the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordValidation {
    /// Whether the password satisfies every enabled policy rule.
    pub is_valid: bool,
    /// Human-readable description of each violated rule.
    pub errors: Vec<String>,
    /// Strength band derived from the score.
    pub strength: PasswordStrength,
    /// Deterministic 0–100 strength score.
    pub score: u8,
}

/// Validates and scores passwords and generates compliant ones.
///
/// Owns the mutable [`PasswordPolicy`] singleton; the configuration file
/// seeds it and an authorized actor may replace it at runtime.
#[derive(Debug)]
pub struct CredentialPolicyEngine {
    policy: Mutex<PasswordPolicy>,
}

impl CredentialPolicyEngine {
    /// Creates an engine seeded with the given policy.
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            policy: Mutex::new(policy),
        }
    }

    /// Returns a copy of the current policy.
    pub fn policy(&self) -> PasswordPolicy {
        self.policy.lock().expect("policy poisoned").clone()
    }

    /// Replaces the policy wholesale.
    pub fn set_policy(&self, policy: PasswordPolicy) {
        *self.policy.lock().expect("policy poisoned") = policy;
        info!("password policy replaced");
    }

    /// Validates `password` against the current policy.
    ///
    /// When `user_info` is provided and the policy enables the check, the
    /// password (case-insensitively) must not contain the user's first
    /// name, last name, or email local-part.
    pub fn validate(&self, password: &str, user_info: Option<&UserInfo>) -> PasswordValidation {
        let policy = self.policy();
        let length = password.chars().count();
        let mut errors = Vec::new();

        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_special = password.chars().any(|c| !c.is_alphanumeric());

        let lowered = password.to_lowercase();
        let is_common = COMMON_PASSWORDS.contains(&lowered.as_str());
        let contains_user_info = user_info
            .map(|info| info.fragments().iter().any(|f| lowered.contains(f)))
            .unwrap_or(false);

        if length < policy.min_length {
            errors.push(format!(
                "Password must be at least {} characters long",
                policy.min_length
            ));
        }
        if length > policy.max_length {
            errors.push(format!(
                "Password must be at most {} characters long",
                policy.max_length
            ));
        }
        if policy.require_uppercase && !has_upper {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if policy.require_lowercase && !has_lower {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if policy.require_numbers && !has_digit {
            errors.push("Password must contain at least one digit".to_string());
        }
        if policy.require_special_chars && !has_special {
            errors.push("Password must contain at least one special character".to_string());
        }
        if policy.prevent_common_passwords && is_common {
            errors.push("Password is too common; choose a less guessable one".to_string());
        }
        if policy.prevent_user_info && contains_user_info {
            errors.push("Password must not contain your name or email".to_string());
        }

        let mut score: u32 = 0;
        if length >= policy.min_length {
            score += WEIGHT_MIN_LENGTH as u32;
        }
        if has_upper {
            score += WEIGHT_UPPERCASE as u32;
        }
        if has_lower {
            score += WEIGHT_LOWERCASE as u32;
        }
        if has_digit {
            score += WEIGHT_DIGIT as u32;
        }
        if has_special {
            score += WEIGHT_SPECIAL as u32;
        }
        if !is_common {
            score += WEIGHT_NOT_COMMON as u32;
        }
        if !contains_user_info {
            score += WEIGHT_NOT_USER_INFO as u32;
        }
        if length >= 12 {
            score += BONUS_LENGTH_12 as u32;
        }
        if length >= 16 {
            score += BONUS_LENGTH_16 as u32;
        }
        if has_upper && has_lower && has_digit && has_special {
            score += BONUS_ALL_CLASSES as u32;
        }
        let score = score.min(100) as u8;

        PasswordValidation {
            is_valid: errors.is_empty(),
            errors,
            strength: PasswordStrength::from_score(score),
            score,
        }
    }

    /// Generates a random password satisfying the current policy.
    ///
    /// The requested `length` is clamped to the policy's length bounds so
    /// the result always passes [`CredentialPolicyEngine::validate`].
    pub fn generate_password(&self, length: usize) -> String {
        let policy = self.policy();
        let length = length.max(policy.min_length).min(policy.max_length);
        // Regeneration guards against the freak case of landing on a
        // denylisted word when no character class is required.
        loop {
            let candidate = generator::generate(&policy, length);
            if !policy.prevent_common_passwords
                || !COMMON_PASSWORDS.contains(&candidate.to_lowercase().as_str())
            {
                return candidate;
            }
        }
    }
}
