//! # crudhub-entity
//!
//! Entity building blocks for CrudHub. Concrete entities embed
//! [`SoftDelete`](base::SoftDelete) (and optionally
//! [`AuditFields`](crudhub_core::types::AuditFields)) with
//! `#[serde(flatten)]` and implement
//! [`Entity`](crudhub_core::traits::Entity) through [`impl_entity!`].

pub mod base;
pub mod tenant;

pub use base::{DocumentRef, SoftDelete, TenantRef};
pub use tenant::Tenant;

#[doc(hidden)]
pub mod __private {
    pub use crudhub_core::traits::Entity;
    pub use crudhub_core::types::{AuditFields, FieldDescriptor};
}
