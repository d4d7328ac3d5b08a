//! Generic soft-delete repository over a MongoDB collection.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use mongodb::bson::{self, Document, doc};
use mongodb::options::{Collation, CollationStrength, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::{debug, warn};

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{Entity, Repository};
use crudhub_core::types::metadata::STORED_ID_FIELD;
use crudhub_core::types::{Auditor, EntityMetadata, PageRequest, PageResponse, Query, SortField};

use crate::connection::MongoConnection;
use crate::document::{
    CREATED_FIELDS, deactivation, decode, decode_all, encode, entity_ids, prepare_insert,
};
use crate::query::pipeline::ROOT_FIELD;
use crate::query::relation::{OrderKey, collect_reference_ids};
use crate::query::{
    FieldSort, RankTable, SortKey, SortPlan, active_only, ids_filter, order_documents,
    query_filter, search_filter, sort_pipeline,
};

/// MongoDB implementation of [`Repository`] for any [`Entity`].
///
/// The entity's field table is validated once at construction and shared.
pub struct MongoRepository<E: Entity> {
    database: Database,
    collection: Collection<Document>,
    metadata: Arc<EntityMetadata>,
    bulk_concurrency: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for MongoRepository<E> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            collection: self.collection.clone(),
            metadata: Arc::clone(&self.metadata),
            bulk_concurrency: self.bulk_concurrency,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> MongoRepository<E> {
    /// Create a repository for `E`, validating its field table.
    pub fn new(connection: &MongoConnection) -> AppResult<Self> {
        Self::with_database(connection.database().clone(), connection.bulk_concurrency())
    }

    /// Create a repository bound to an explicit database handle.
    pub fn with_database(database: Database, bulk_concurrency: usize) -> AppResult<Self> {
        let metadata = EntityMetadata::for_entity::<E>()?;
        debug!(
            collection = %metadata.collection,
            fields = metadata.fields.len(),
            "Registered entity repository"
        );
        Ok(Self {
            collection: database.collection::<Document>(E::COLLECTION),
            database,
            metadata: Arc::new(metadata),
            bulk_concurrency: bulk_concurrency.max(1),
            _entity: PhantomData,
        })
    }

    /// The validated field table.
    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    async fn fetch(&self, filter: Document, page: Option<&PageRequest>) -> AppResult<Vec<Document>> {
        let mut find = self.collection.find(filter);
        if let Some(page) = page {
            find = find
                .skip(page.offset().min(i64::MAX as u64))
                .limit(i64::try_from(page.limit()).unwrap_or(i64::MAX));
        }
        find.await
            .map_err(db_error("Failed to query documents"))?
            .try_collect()
            .await
            .map_err(db_error("Failed to read documents"))
    }

    async fn total(
        &self,
        filter: &Document,
        page: Option<&PageRequest>,
        fetched: usize,
    ) -> AppResult<u64> {
        match page {
            Some(_) => self
                .collection
                .count_documents(filter.clone())
                .await
                .map_err(db_error("Failed to count documents")),
            None => Ok(fetched as u64),
        }
    }

    /// Execute an active-scoped query with the given ordering and page.
    async fn query_page(
        &self,
        filter: Document,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        let plan = SortPlan::resolve(&self.metadata, sort)?;
        let filter = active_only(filter);

        match plan.field_keys() {
            None => self.relation_page(filter, &plan, page).await,
            Some(keys) if keys.is_empty() => {
                let documents = self.fetch(filter.clone(), page).await?;
                let total = self.total(&filter, page, documents.len()).await?;
                Ok(PageResponse::from_parts(decode_all::<E>(documents)?, page, total))
            }
            Some(keys) => self.aggregate_page(filter, &keys, page).await,
        }
    }

    async fn aggregate_page(
        &self,
        filter: Document,
        keys: &[FieldSort],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        debug!(
            collection = E::COLLECTION,
            keys = keys.len(),
            "Sorting through aggregation pipeline"
        );
        let pipeline = sort_pipeline(filter.clone(), keys, page);
        let projected: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .allow_disk_use(true)
            .await
            .map_err(db_error("Failed to run sort pipeline"))?
            .try_collect()
            .await
            .map_err(db_error("Failed to read sort pipeline results"))?;

        let documents = projected
            .into_iter()
            .map(|mut row| match row.remove(ROOT_FIELD) {
                Some(bson::Bson::Document(document)) => Ok(document),
                _ => Err(AppError::serialization(
                    "Sort pipeline result is missing the projected document",
                )),
            })
            .collect::<AppResult<Vec<_>>>()?;

        let total = self.total(&filter, page, documents.len()).await?;
        Ok(PageResponse::from_parts(decode_all::<E>(documents)?, page, total))
    }

    async fn relation_page(
        &self,
        filter: Document,
        plan: &SortPlan,
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        let mut documents = self.fetch(filter, None).await?;
        if page.is_some() {
            warn!(
                collection = E::COLLECTION,
                documents = documents.len(),
                "Relation sort materialises the full result set before paging"
            );
        }

        let mut keys = Vec::with_capacity(plan.keys().len());
        for key in plan.keys() {
            keys.push(match key {
                SortKey::Field(field) => OrderKey::Value {
                    path: field.path.clone(),
                    direction: field.direction,
                },
                SortKey::Relation(relation) => {
                    let ids = collect_reference_ids(&documents, &relation.field);
                    let ordered = self
                        .ordered_reference_ids(
                            &relation.collection,
                            &relation.sub_path,
                            relation.direction.as_mongo(),
                            ids,
                        )
                        .await?;
                    OrderKey::Rank {
                        field: relation.field.clone(),
                        table: RankTable::from_ordered_ids(ordered),
                    }
                }
            });
        }

        order_documents(&mut documents, &keys);
        let total = documents.len() as u64;
        let documents = match page {
            Some(page) => page.slice(documents),
            None => documents,
        };
        Ok(PageResponse::from_parts(decode_all::<E>(documents)?, page, total))
    }

    /// Ids of active referenced documents, ordered by `sub_path`.
    async fn ordered_reference_ids(
        &self,
        collection: &str,
        sub_path: &str,
        direction: i32,
        ids: Vec<String>,
    ) -> AppResult<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let collation = Collation::builder()
            .locale("en".to_string())
            .strength(CollationStrength::Secondary)
            .build();

        let referenced: Vec<Document> = self
            .database
            .collection::<Document>(collection)
            .find(active_only(ids_filter(&ids)))
            .sort(doc! { sub_path: direction })
            .collation(collation)
            .projection(doc! { STORED_ID_FIELD: 1 })
            .await
            .map_err(db_error("Failed to query referenced documents"))?
            .try_collect()
            .await
            .map_err(db_error("Failed to read referenced documents"))?;

        Ok(referenced
            .into_iter()
            .filter_map(|d| match d.get(STORED_ID_FIELD) {
                Some(bson::Bson::String(id)) => Some(id.clone()),
                Some(bson::Bson::ObjectId(oid)) => Some(oid.to_hex()),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MongoRepository<E> {
    async fn save(&self, mut entity: E, auditor: &Auditor) -> AppResult<E> {
        let Some(id) = entity.id().filter(|id| !id.is_empty()).map(str::to_string) else {
            return self.insert(entity, auditor).await;
        };

        entity.stamp_audit(auditor, false);
        let mut set = encode(&entity)?;
        set.remove(STORED_ID_FIELD);

        let mut update = Document::new();
        if E::AUDITED {
            let mut on_insert = Document::new();
            for field in CREATED_FIELDS {
                if let Some(value) = set.remove(field) {
                    on_insert.insert(field, value);
                }
            }
            if !on_insert.is_empty() {
                update.insert("$setOnInsert", on_insert);
            }
        }
        update.insert("$set", set);

        let stored = self
            .collection
            .find_one_and_update(doc! { STORED_ID_FIELD: id.as_str() }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(db_error("Failed to save document"))?;

        debug!(collection = E::COLLECTION, id = %id, "Saved document");
        match stored {
            Some(document) => decode::<E>(document),
            None => Ok(entity),
        }
    }

    async fn save_all(&self, entities: Vec<E>, auditor: &Auditor) -> AppResult<Vec<E>> {
        if entities.iter().all(|e| e.is_new()) {
            return self.insert_all(entities, auditor).await;
        }
        stream::iter(entities)
            .map(|entity| self.save(entity, auditor))
            .buffer_unordered(self.bulk_concurrency)
            .try_collect()
            .await
    }

    async fn insert(&self, entity: E, auditor: &Auditor) -> AppResult<E> {
        let entity = prepare_insert(entity, auditor);
        self.collection
            .insert_one(encode(&entity)?)
            .await
            .map_err(db_error("Failed to insert document"))?;
        debug!(collection = E::COLLECTION, id = ?entity.id(), "Inserted document");
        Ok(entity)
    }

    async fn insert_all(&self, entities: Vec<E>, auditor: &Auditor) -> AppResult<Vec<E>> {
        if entities.is_empty() {
            return Ok(entities);
        }
        let entities: Vec<E> = entities
            .into_iter()
            .map(|e| prepare_insert(e, auditor))
            .collect();
        let documents = entities
            .iter()
            .map(encode)
            .collect::<AppResult<Vec<_>>>()?;

        self.collection
            .insert_many(documents)
            .await
            .map_err(db_error("Failed to insert documents"))?;
        debug!(collection = E::COLLECTION, count = entities.len(), "Inserted documents");
        Ok(entities)
    }

    async fn exists_by_id(&self, id: &str) -> AppResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { STORED_ID_FIELD: id })
            .limit(1)
            .await
            .map_err(db_error("Failed to check document existence"))?;
        Ok(count > 0)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<E>> {
        self.collection
            .find_one(doc! { STORED_ID_FIELD: id })
            .await
            .map_err(db_error("Failed to find document by id"))?
            .map(decode::<E>)
            .transpose()
    }

    async fn count(&self) -> AppResult<u64> {
        self.collection
            .count_documents(active_only(Document::new()))
            .await
            .map_err(db_error("Failed to count documents"))
    }

    async fn delete_by_id(&self, id: &str, auditor: &Auditor) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { STORED_ID_FIELD: id }, deactivation::<E>(auditor)?)
            .await
            .map_err(db_error("Failed to soft-delete document"))?;

        if result.matched_count == 0 {
            return Err(AppError::not_found(format!("{} {id} not found", E::NAME)));
        }
        debug!(collection = E::COLLECTION, id = %id, "Soft-deleted document");
        Ok(())
    }

    async fn delete(&self, entity: &E, auditor: &Auditor) -> AppResult<()> {
        match entity.id().filter(|id| !id.is_empty()) {
            Some(id) => self.delete_by_id(id, auditor).await,
            None => Err(AppError::validation(format!(
                "Cannot delete a {} without an id",
                E::NAME
            ))),
        }
    }

    async fn delete_all(&self, auditor: &Auditor) -> AppResult<u64> {
        let result = self
            .collection
            .update_many(active_only(Document::new()), deactivation::<E>(auditor)?)
            .await
            .map_err(db_error("Failed to soft-delete documents"))?;
        debug!(
            collection = E::COLLECTION,
            count = result.modified_count,
            "Soft-deleted all documents"
        );
        Ok(result.modified_count)
    }

    async fn delete_many(&self, entities: &[E], auditor: &Auditor) -> AppResult<u64> {
        let ids = entity_ids(entities)?;
        if ids.is_empty() {
            return Ok(0);
        }
        let filter = ids_filter(&ids);
        let found = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(db_error("Failed to check document existence"))?;
        if found < ids.len() as u64 {
            return Err(AppError::not_found(format!(
                "{} of {} {} documents not found",
                ids.len() as u64 - found,
                ids.len(),
                E::NAME
            )));
        }

        let result = self
            .collection
            .update_many(filter, deactivation::<E>(auditor)?)
            .await
            .map_err(db_error("Failed to soft-delete documents"))?;
        debug!(
            collection = E::COLLECTION,
            count = result.matched_count,
            "Soft-deleted documents"
        );
        Ok(result.matched_count)
    }

    async fn find_one_by_query(&self, query: &Query) -> AppResult<Option<E>> {
        self.collection
            .find_one(query_filter(query)?)
            .await
            .map_err(db_error("Failed to find document"))?
            .map(decode::<E>)
            .transpose()
    }

    async fn search(
        &self,
        key: Option<&str>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        let filter = match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => search_filter(&self.metadata, key),
            None => Document::new(),
        };
        self.query_page(filter, sort, page).await
    }

    async fn find_all_query_pageable(
        &self,
        query: Option<&Query>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        let filter = match query {
            Some(query) => query_filter(query)?,
            None => Document::new(),
        };
        self.query_page(filter, sort, page).await
    }

    async fn find_all_by_ids(&self, ids: &[String], sort: &[SortField]) -> AppResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.query_page(ids_filter(ids), sort, None).await?.items)
    }
}

/// Map a driver error, keeping duplicate-key detection, with context.
fn db_error(context: &'static str) -> impl Fn(mongodb::error::Error) -> AppError {
    move |e| {
        let mut err = AppError::from(e);
        err.message = format!("{context}: {}", err.message);
        err
    }
}
