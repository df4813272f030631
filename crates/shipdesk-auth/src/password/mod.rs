//! Credential policy enforcement and generation.

mod generator;
mod validator;

pub use validator::{
    CredentialPolicyEngine, PasswordStrength, PasswordValidation, UserInfo,
};
