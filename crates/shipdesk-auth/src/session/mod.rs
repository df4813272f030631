//! Admin session token validation and issuance.

mod claims;
mod issuer;
mod validator;

pub use claims::SessionClaims;
pub use issuer::SessionIssuer;
pub use validator::SessionValidator;
