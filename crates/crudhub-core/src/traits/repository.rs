//! Generic repository trait for database access.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::entity::Entity;
use crate::types::audit::Auditor;
use crate::types::filter::{FilterField, FilterOp, FilterValue, Query};
use crate::types::pagination::{PageRequest, PageResponse};
use crate::types::sorting::SortField;

/// Generic soft-delete repository.
///
/// Every read except the single-document lookups ([`find_by_id`],
/// [`exists_by_id`] and [`find_one_by_query`]) only sees active documents.
///
/// [`find_by_id`]: Repository::find_by_id
/// [`exists_by_id`]: Repository::exists_by_id
/// [`find_one_by_query`]: Repository::find_one_by_query
/// Writes stamp audit fields with the given auditor.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync + 'static {
    /// Insert when the entity has no id, otherwise replace (upsert) by id.
    async fn save(&self, entity: E, auditor: &Auditor) -> AppResult<E>;

    /// Save many entities. Result order is unspecified.
    async fn save_all(&self, entities: Vec<E>, auditor: &Auditor) -> AppResult<Vec<E>>;

    /// Insert as a new active document.
    async fn insert(&self, entity: E, auditor: &Auditor) -> AppResult<E>;

    /// Insert many new active documents.
    async fn insert_all(&self, entities: Vec<E>, auditor: &Auditor) -> AppResult<Vec<E>>;

    /// Whether a document with this id exists, active or not.
    async fn exists_by_id(&self, id: &str) -> AppResult<bool>;

    /// Find a document by id, active or not.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<E>>;

    /// Count active documents.
    async fn count(&self) -> AppResult<u64>;

    /// Soft-delete by id.
    async fn delete_by_id(&self, id: &str, auditor: &Auditor) -> AppResult<()>;

    /// Soft-delete the given entity.
    async fn delete(&self, entity: &E, auditor: &Auditor) -> AppResult<()>;

    /// Soft-delete every active document, returning how many were flagged.
    async fn delete_all(&self, auditor: &Auditor) -> AppResult<u64>;

    /// Soft-delete each of `entities`, returning how many were flagged.
    ///
    /// Fails before writing anything when an entity has no id or its id is
    /// not stored.
    async fn delete_many(&self, entities: &[E], auditor: &Auditor) -> AppResult<u64>;

    /// A document matching `query`, active or not.
    async fn find_one_by_query(&self, query: &Query) -> AppResult<Option<E>>;

    /// A document whose `field` equals `value`, active or not.
    ///
    /// Meant for fields holding unique values such as a login or an email.
    async fn find_one_by_field(&self, field: &str, value: FilterValue) -> AppResult<Option<E>> {
        let query = Query::from(FilterField::new(field, FilterOp::Eq, value));
        self.find_one_by_query(&query).await
    }

    /// Case-insensitive substring search across the searchable fields.
    async fn search(
        &self,
        key: Option<&str>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>>;

    /// Filtered, ordered and optionally paginated query with its total.
    async fn find_all_query_pageable(
        &self,
        query: Option<&Query>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>>;

    /// Every active document in the given order.
    async fn find_all(&self, sort: &[SortField]) -> AppResult<Vec<E>> {
        Ok(self.find_all_query_pageable(None, sort, None).await?.items)
    }

    /// Active documents matching `query`.
    async fn find_all_by_query(&self, query: &Query, sort: &[SortField]) -> AppResult<Vec<E>> {
        Ok(self
            .find_all_query_pageable(Some(query), sort, None)
            .await?
            .items)
    }

    /// Active documents whose id is in `ids`.
    async fn find_all_by_ids(&self, ids: &[String], sort: &[SortField]) -> AppResult<Vec<E>>;
}
