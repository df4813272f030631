//! # shipdesk-auth
//!
//! Admin access control for the ShipDesk portal.
//!
//! ## Modules
//!
//! - `gate` — origin allow-listing and the login-attempt/lockout state machine
//! - `password` — credential policy validation, scoring, and generation
//! - `session` — HMAC-verified session token validation and issuance

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{AccessGate, AttemptOutcome, AttemptRecord, GateSnapshot, LoginOutcome};
pub use password::{CredentialPolicyEngine, PasswordStrength, PasswordValidation, UserInfo};
pub use session::{SessionClaims, SessionIssuer, SessionValidator};
