//! Application entities served alongside the built-in tenants.

pub mod contact;
