//! Tenant domain entity.

pub mod model;

pub use model::Tenant;
