//! Generic CRUD service.

pub mod service;

pub use service::CrudService;
