//! Service marker trait.

/// Marker trait for business logic services.
///
/// All services in `crudhub-service` implement this trait so they can be
/// shared behind `Arc` in application state.
pub trait Service: Send + Sync + 'static {}
