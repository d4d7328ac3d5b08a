//! # crudhub-api
//!
//! HTTP API layer for CrudHub built on Axum.
//!
//! A [`Resource`] turns a [`CrudService`](crudhub_service::CrudService) and a
//! [`DtoMapper`] into the create / update / list / get / delete / Excel
//! endpoints of one entity type. [`ApiBuilder`] assembles resources with the
//! health and API docs endpoints and the middleware stack (tracing, request
//! logging, CORS, body limit).

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mapper;
pub mod middleware;
pub mod resource;
pub mod tenant;

pub use app::ApiBuilder;
pub use dto::ResourceDto;
pub use error::{ApiError, ApiErrorResponse};
pub use mapper::DtoMapper;
pub use resource::{Resource, ResourceDescriptor};
