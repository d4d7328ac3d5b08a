//! # crudhub-auth
//!
//! Authentication helpers for CrudHub.
//!
//! ## Modules
//!
//! - `bearer` - extraction of the token from an `Authorization` header
//! - `jwt` - claims, token issuance, and the [`TokenVerifier`] seam
//! - `principal` - the authenticated caller and its auditor name
//! - `dto` - authentication wire types

pub mod bearer;
pub mod dto;
pub mod jwt;
pub mod principal;

pub use bearer::resolve_token;
pub use dto::RefreshRequest;
pub use jwt::{Claims, JwtEncoder, JwtVerifier, TokenVerifier};
pub use principal::Principal;
