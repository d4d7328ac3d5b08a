//! Handlers that are not tied to a single resource.

pub mod docs;
pub mod health;
