//! Embeddable base types shared by every entity.

pub mod macros;
pub mod reference;
pub mod soft_delete;

pub use reference::{DocumentRef, TenantRef};
pub use soft_delete::SoftDelete;
