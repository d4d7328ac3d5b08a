//! # crudhub-service
//!
//! Service layer for CrudHub. [`CrudService`] forwards to a
//! [`Repository`](crudhub_core::traits::Repository) on behalf of the
//! caller described by a [`RequestContext`].
//!
//! Services follow constructor injection; the repository is provided at
//! construction time as an `Arc<dyn Repository<E>>`.

pub mod context;
pub mod crud;

pub use context::RequestContext;
pub use crud::CrudService;
