//! Custom Axum extractors.

pub mod auth;
pub mod list;

pub use auth::CurrentUser;
pub use list::ListParams;
