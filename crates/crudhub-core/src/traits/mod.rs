//! Core traits defined in `crudhub-core` and implemented by other crates.

pub mod entity;
pub mod repository;
pub mod service;

pub use entity::Entity;
pub use repository::Repository;
pub use service::Service;
