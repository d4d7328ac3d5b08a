//! # crudhub-database
//!
//! MongoDB connection management and [`MongoRepository`], the generic
//! implementation of [`Repository`](crudhub_core::traits::Repository).
//!
//! Query construction lives in [`query`] as pure functions over BSON
//! documents so it can be tested without a server. [`MemoryRepository`]
//! applies the same semantics to an in-process store for single-node
//! development and tests.

pub mod connection;
pub mod document;
pub mod memory;
pub mod query;
pub mod repository;

pub use connection::MongoConnection;
pub use memory::{MemoryRepository, MemoryStore};
pub use repository::MongoRepository;
