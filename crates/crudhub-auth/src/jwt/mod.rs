//! JWT token encoding, verification, and claims.

pub mod claims;
pub mod encoder;
pub mod verifier;

pub use claims::Claims;
pub use encoder::JwtEncoder;
pub use verifier::{JwtVerifier, TokenVerifier};
