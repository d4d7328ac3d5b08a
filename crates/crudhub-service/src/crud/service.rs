//! Pass-through service over a generic repository.

use std::sync::Arc;

use tracing::debug;

use crudhub_core::error::AppError;
use crudhub_core::traits::{Entity, Repository, Service};
use crudhub_core::types::{FilterValue, PageRequest, PageResponse, SortField};

use crate::context::RequestContext;

/// CRUD operations for one entity type.
pub struct CrudService<E: Entity> {
    /// Backing repository.
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for CrudService<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> std::fmt::Debug for CrudService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudService")
            .field("entity", &E::NAME)
            .finish()
    }
}

impl<E: Entity> Service for CrudService<E> {}

impl<E: Entity> CrudService<E> {
    /// Creates a new service over the given repository.
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// Insert a new entity or update an existing one.
    pub async fn save(&self, ctx: &RequestContext, entity: E) -> Result<E, AppError> {
        debug!(entity = E::NAME, id = ?entity.id(), auditor = %ctx.auditor, "Request to save");
        self.repo.save(entity, &ctx.auditor).await
    }

    /// Save many entities.
    pub async fn save_all(
        &self,
        ctx: &RequestContext,
        entities: Vec<E>,
    ) -> Result<Vec<E>, AppError> {
        debug!(entity = E::NAME, count = entities.len(), "Request to save all");
        self.repo.save_all(entities, &ctx.auditor).await
    }

    /// Every active entity, ordered.
    pub async fn find_all(&self, sort: &[SortField]) -> Result<Vec<E>, AppError> {
        debug!(entity = E::NAME, "Request to get all");
        self.repo.find_all(sort).await
    }

    /// One page of active entities.
    pub async fn find_page(
        &self,
        sort: &[SortField],
        page: &PageRequest,
    ) -> Result<PageResponse<E>, AppError> {
        debug!(entity = E::NAME, page = page.page, size = page.page_size, "Request to get page");
        self.repo.find_all_query_pageable(None, sort, Some(page)).await
    }

    /// Find by id, including soft-deleted entities.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<E>, AppError> {
        debug!(entity = E::NAME, id = %id, "Request to get");
        self.repo.find_by_id(id).await
    }

    /// Active entities with the given ids.
    pub async fn find_all_by_ids(
        &self,
        ids: &[String],
        sort: &[SortField],
    ) -> Result<Vec<E>, AppError> {
        debug!(entity = E::NAME, count = ids.len(), "Request to get by ids");
        self.repo.find_all_by_ids(ids, sort).await
    }

    /// Soft-delete by id.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
        debug!(entity = E::NAME, id = %id, auditor = %ctx.auditor, "Request to delete");
        self.repo.delete_by_id(id, &ctx.auditor).await
    }

    /// Soft-delete the given entities together.
    pub async fn delete_many(&self, ctx: &RequestContext, entities: &[E]) -> Result<u64, AppError> {
        debug!(entity = E::NAME, count = entities.len(), auditor = %ctx.auditor, "Request to delete many");
        self.repo.delete_many(entities, &ctx.auditor).await
    }

    /// Look up an entity by a unique field, including soft-deleted entities.
    pub async fn find_one_by_field(
        &self,
        field: &str,
        value: FilterValue,
    ) -> Result<Option<E>, AppError> {
        debug!(entity = E::NAME, field = %field, "Request to get by field");
        self.repo.find_one_by_field(field, value).await
    }

    /// Free-text search, paged when `page` is given.
    pub async fn search(
        &self,
        key: Option<&str>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> Result<PageResponse<E>, AppError> {
        debug!(entity = E::NAME, key = ?key, "Request to search");
        self.repo.search(key, sort, page).await
    }

    /// Number of active entities.
    pub async fn count(&self) -> Result<u64, AppError> {
        self.repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudhub_core::types::Auditor;
    use crudhub_database::{MemoryRepository, MemoryStore};
    use crudhub_entity::Tenant;

    fn service() -> CrudService<Tenant> {
        let repo = MemoryRepository::<Tenant>::new(MemoryStore::new()).unwrap();
        CrudService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_save_stamps_context_auditor() {
        let svc = service();
        let ctx = RequestContext::new(Auditor::new("dave"));
        let saved = svc.save(&ctx, Tenant::new("Acme", "ACME")).await.unwrap();
        assert_eq!(saved.audit.created_by, "dave");
        assert_eq!(svc.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_lookup() {
        let svc = service();
        let ctx = RequestContext::anonymous();
        let saved = svc.save(&ctx, Tenant::new("Acme", "ACME")).await.unwrap();
        let id = saved.id().unwrap().to_string();

        svc.delete(&ctx, &id).await.unwrap();
        assert_eq!(svc.count().await.unwrap(), 0);
        assert!(svc.find_all(&[]).await.unwrap().is_empty());
        assert!(!svc.find_by_id(&id).await.unwrap().unwrap().is_active());
    }

    #[tokio::test]
    async fn test_delete_many_then_lookup_by_code() {
        let svc = service();
        let ctx = RequestContext::anonymous();
        let saved = svc
            .save_all(&ctx, vec![Tenant::new("Acme", "ACME"), Tenant::new("Globex", "GLX")])
            .await
            .unwrap();

        assert_eq!(svc.delete_many(&ctx, &saved).await.unwrap(), 2);
        assert_eq!(svc.count().await.unwrap(), 0);

        let found = svc
            .find_one_by_field("code", FilterValue::String("GLX".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Globex");
        assert!(!found.is_active());
    }

    #[tokio::test]
    async fn test_find_page() {
        let svc = service();
        let ctx = RequestContext::anonymous();
        let tenants = (1..=5)
            .map(|i| Tenant::new(format!("t{i}"), format!("C{i}")))
            .collect();
        svc.save_all(&ctx, tenants).await.unwrap();

        let page = svc
            .find_page(&[SortField::desc("name")], &PageRequest::new(2, 2))
            .await
            .unwrap();
        let names: Vec<_> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["t3", "t2"]);
        assert_eq!(page.total_pages, 3);
    }
}
