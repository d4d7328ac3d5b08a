//! # crudhub-core
//!
//! Core crate for CrudHub. Contains the `Entity` and `Repository` traits,
//! the per-entity field metadata table, configuration schemas,
//! pagination/sorting/filter types, audit types, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other CrudHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
