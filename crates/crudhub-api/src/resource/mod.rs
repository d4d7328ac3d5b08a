//! Generic REST resource for one entity type.

mod descriptor;
mod handlers;

use std::marker::PhantomData;
use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post};

use crudhub_auth::TokenVerifier;
use crudhub_core::traits::Entity;
use crudhub_excel::ExcelService;
use crudhub_service::CrudService;

use crate::dto::ResourceDto;
use crate::mapper::DtoMapper;

pub use descriptor::{EndpointDescriptor, ResourceDescriptor};

/// Response header carrying the total number of matching entities.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// State shared by the handlers of one resource.
pub struct ResourceState<E: Entity, D: ResourceDto, M: DtoMapper<E, D>> {
    service: CrudService<E>,
    mapper: Arc<M>,
    excel: ExcelService,
    verifier: Arc<dyn TokenVerifier>,
    base_path: Arc<str>,
    _dto: PhantomData<fn() -> D>,
}

impl<E: Entity, D: ResourceDto, M: DtoMapper<E, D>> Clone for ResourceState<E, D, M> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            mapper: Arc::clone(&self.mapper),
            excel: self.excel,
            verifier: Arc::clone(&self.verifier),
            base_path: Arc::clone(&self.base_path),
            _dto: PhantomData,
        }
    }
}

impl<E: Entity, D: ResourceDto, M: DtoMapper<E, D>> FromRef<ResourceState<E, D, M>>
    for Arc<dyn TokenVerifier>
{
    fn from_ref(state: &ResourceState<E, D, M>) -> Self {
        Arc::clone(&state.verifier)
    }
}

/// CRUD, search and Excel endpoints for entity `E`, served as DTO `D`.
///
/// Mounted under a base path such as `/api/tenants`:
///
/// | Method | Path | Handler |
/// |--------|------|---------|
/// | POST | `{base}` | create |
/// | PUT | `{base}` | update |
/// | GET | `{base}` | list / search / export |
/// | GET | `{base}/{id}` | get by id |
/// | DELETE | `{base}/{id}` | soft delete |
/// | POST | `{base}/excel` | bulk upsert from a workbook |
pub struct Resource<E: Entity, D: ResourceDto, M: DtoMapper<E, D>> {
    state: ResourceState<E, D, M>,
}

impl<E: Entity, D: ResourceDto, M: DtoMapper<E, D>> Resource<E, D, M> {
    /// Creates a resource mounted at `base_path`.
    pub fn new(
        base_path: &str,
        service: CrudService<E>,
        mapper: M,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let trimmed = base_path.trim().trim_end_matches('/');
        let base_path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self {
            state: ResourceState {
                service,
                mapper: Arc::new(mapper),
                excel: ExcelService::new(),
                verifier,
                base_path: Arc::from(base_path),
                _dto: PhantomData,
            },
        }
    }

    /// Replaces the spreadsheet service.
    pub fn with_excel(mut self, excel: ExcelService) -> Self {
        self.state.excel = excel;
        self
    }

    /// The mount path.
    pub fn base_path(&self) -> &str {
        &self.state.base_path
    }

    /// Endpoint listing for the API docs.
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::standard(E::NAME, self.base_path())
    }

    /// Builds the router with this resource's state applied.
    pub fn into_router(self) -> Router {
        let base = self.base_path().to_string();
        Router::new()
            .route(
                &base,
                get(handlers::list::<E, D, M>)
                    .post(handlers::create::<E, D, M>)
                    .put(handlers::update::<E, D, M>),
            )
            .route(
                &format!("{base}/excel"),
                post(handlers::upload_excel::<E, D, M>),
            )
            .route(
                &format!("{base}/{{id}}"),
                get(handlers::get_one::<E, D, M>).delete(handlers::delete_one::<E, D, M>),
            )
            .with_state(self.state)
    }
}
