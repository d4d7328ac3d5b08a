//! In-memory repository for single-node development and tests.
//!
//! Documents are kept in their stored BSON shape so search, soft delete,
//! relation ordering and audit stamping behave like [`MongoRepository`].
//!
//! [`MongoRepository`]: crate::repository::MongoRepository

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::sync::Mutex;
use tracing::debug;

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{Entity, Repository};
use crudhub_core::types::metadata::{ACTIVE_FIELD, ID_FIELD, STORED_ID_FIELD};
use crudhub_core::types::{
    Auditor, EntityMetadata, FilterField, FilterOp, FilterValue, PageRequest, PageResponse, Query,
    SortField,
};

use crate::document::{
    CREATED_FIELDS, deactivation_fields, decode, decode_all, encode, entity_ids, prepare_insert,
};
use crate::query::filter::to_bson;
use crate::query::relation::{OrderKey, collect_reference_ids, compare_bson};
use crate::query::{RankTable, SortKey, SortPlan, order_documents};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Shared in-process document store, one map per collection.
///
/// Repositories created from the same store can resolve references into
/// each other's collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents in `collection`, active or not.
    pub async fn stored_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

/// [`Repository`] over a [`MemoryStore`].
pub struct MemoryRepository<E: Entity> {
    store: MemoryStore,
    metadata: Arc<EntityMetadata>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            metadata: Arc::clone(&self.metadata),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    /// Create a repository for `E`, validating its field table.
    pub fn new(store: MemoryStore) -> AppResult<Self> {
        Ok(Self {
            store,
            metadata: Arc::new(EntityMetadata::for_entity::<E>()?),
            _entity: PhantomData,
        })
    }

    /// Active documents matching `predicate`, ordered and paged.
    async fn query_page<F>(
        &self,
        predicate: F,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>>
    where
        F: Fn(&Document) -> AppResult<bool>,
    {
        let plan = SortPlan::resolve(&self.metadata, sort)?;
        let collections = self.store.collections.lock().await;

        let mut documents = Vec::new();
        if let Some(stored) = collections.get(E::COLLECTION) {
            for document in stored.values().filter(|d| is_active(d)) {
                if predicate(document)? {
                    documents.push(document.clone());
                }
            }
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
                    let mut referenced: Vec<Document> = collections
                        .get(&relation.collection)
                        .map(|c| {
                            ids.iter()
                                .filter_map(|id| c.get(id))
                                .filter(|d| is_active(d))
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    order_documents(
                        &mut referenced,
                        &[OrderKey::Value {
                            path: relation.sub_path.clone(),
                            direction: relation.direction,
                        }],
                    );
                    OrderKey::Rank {
                        field: relation.field.clone(),
                        table: RankTable::from_ordered_ids(
                            referenced.iter().filter_map(document_id),
                        ),
                    }
                }
            });
        }
        drop(collections);

        order_documents(&mut documents, &keys);
        let total = documents.len() as u64;
        let documents = match page {
            Some(page) => page.slice(documents),
            None => documents,
        };
        Ok(PageResponse::from_parts(decode_all::<E>(documents)?, page, total))
    }

    async fn put(&self, id: String, document: Document) {
        self.store
            .collections
            .lock()
            .await
            .entry(E::COLLECTION.to_string())
            .or_default()
            .insert(id, document);
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn save(&self, mut entity: E, auditor: &Auditor) -> AppResult<E> {
        let Some(id) = entity.id().filter(|id| !id.is_empty()).map(str::to_string) else {
            return self.insert(entity, auditor).await;
        };

        entity.stamp_audit(auditor, false);
        let mut document = encode(&entity)?;

        let mut collections = self.store.collections.lock().await;
        let stored = collections.entry(E::COLLECTION.to_string()).or_default();
        if let Some(previous) = stored.get(&id) {
            if E::AUDITED {
                for field in CREATED_FIELDS {
                    if let Some(value) = previous.get(field) {
                        document.insert(field, value.clone());
                    }
                }
            }
        }
        stored.insert(id, document.clone());
        drop(collections);

        decode(document)
    }

    async fn save_all(&self, entities: Vec<E>, auditor: &Auditor) -> AppResult<Vec<E>> {
        if entities.iter().all(|e| e.is_new()) {
            return self.insert_all(entities, auditor).await;
        }
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity, auditor).await?);
        }
        Ok(saved)
    }

    async fn insert(&self, entity: E, auditor: &Auditor) -> AppResult<E> {
        let entity = prepare_insert(entity, auditor);
        let id = entity.id().unwrap_or_default().to_string();
        if self.exists_by_id(&id).await? {
            return Err(AppError::conflict(format!("Duplicate key: {} {id}", E::NAME)));
        }
        self.put(id, encode(&entity)?).await;
        debug!(collection = E::COLLECTION, id = ?entity.id(), "Inserted document");
        Ok(entity)
    }

    async fn insert_all(&self, entities: Vec<E>, auditor: &Auditor) -> AppResult<Vec<E>> {
        let mut inserted = Vec::with_capacity(entities.len());
        for entity in entities {
            inserted.push(self.insert(entity, auditor).await?);
        }
        Ok(inserted)
    }

    async fn exists_by_id(&self, id: &str) -> AppResult<bool> {
        Ok(self
            .store
            .collections
            .lock()
            .await
            .get(E::COLLECTION)
            .is_some_and(|c| c.contains_key(id)))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<E>> {
        let document = self
            .store
            .collections
            .lock()
            .await
            .get(E::COLLECTION)
            .and_then(|c| c.get(id).cloned());
        document.map(decode::<E>).transpose()
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self
            .store
            .collections
            .lock()
            .await
            .get(E::COLLECTION)
            .map_or(0, |c| c.values().filter(|d| is_active(d)).count()) as u64)
    }

    async fn delete_by_id(&self, id: &str, auditor: &Auditor) -> AppResult<()> {
        let fields = deactivation_fields::<E>(auditor)?;
        let mut collections = self.store.collections.lock().await;
        let document = collections
            .get_mut(E::COLLECTION)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| AppError::not_found(format!("{} {id} not found", E::NAME)))?;
        for (key, value) in fields {
            document.insert(key, value);
        }
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
        let fields = deactivation_fields::<E>(auditor)?;
        let mut collections = self.store.collections.lock().await;
        let mut flagged = 0;
        if let Some(stored) = collections.get_mut(E::COLLECTION) {
            for document in stored.values_mut().filter(|d| is_active(d)) {
                for (key, value) in &fields {
                    document.insert(key.clone(), value.clone());
                }
                flagged += 1;
            }
        }
        Ok(flagged)
    }

    async fn delete_many(&self, entities: &[E], auditor: &Auditor) -> AppResult<u64> {
        let ids = entity_ids(entities)?;
        if ids.is_empty() {
            return Ok(0);
        }
        let fields = deactivation_fields::<E>(auditor)?;
        let mut collections = self.store.collections.lock().await;
        let stored = collections.entry(E::COLLECTION.to_string()).or_default();
        let missing = ids.iter().filter(|id| !stored.contains_key(*id)).count();
        if missing > 0 {
            return Err(AppError::not_found(format!(
                "{missing} of {} {} documents not found",
                ids.len(),
                E::NAME
            )));
        }
        for id in &ids {
            if let Some(document) = stored.get_mut(id) {
                for (key, value) in &fields {
                    document.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(ids.len() as u64)
    }

    async fn find_one_by_query(&self, query: &Query) -> AppResult<Option<E>> {
        let collections = self.store.collections.lock().await;
        let Some(stored) = collections.get(E::COLLECTION) else {
            return Ok(None);
        };
        for document in stored.values() {
            if matches_query(document, query)? {
                return decode(document.clone()).map(Some);
            }
        }
        Ok(None)
    }

    async fn search(
        &self,
        key: Option<&str>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        let needle = key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);
        let searchable: Vec<String> = self
            .metadata
            .searchable_fields()
            .map(|f| f.stored_name().to_string())
            .collect();

        self.query_page(
            |document| {
                Ok(match &needle {
                    None => true,
                    Some(needle) => searchable.iter().any(|field| {
                        matches!(document.get(field), Some(Bson::String(v)) if v.to_lowercase().contains(needle))
                    }),
                })
            },
            sort,
            page,
        )
        .await
    }

    async fn find_all_query_pageable(
        &self,
        query: Option<&Query>,
        sort: &[SortField],
        page: Option<&PageRequest>,
    ) -> AppResult<PageResponse<E>> {
        self.query_page(
            |document| match query {
                Some(query) => matches_query(document, query),
                None => Ok(true),
            },
            sort,
            page,
        )
        .await
    }

    async fn find_all_by_ids(&self, ids: &[String], sort: &[SortField]) -> AppResult<Vec<E>> {
        Ok(self
            .query_page(
                |document| Ok(document_id(document).is_some_and(|id| ids.contains(&id))),
                sort,
                None,
            )
            .await?
            .items)
    }
}

fn is_active(document: &Document) -> bool {
    document.get_bool(ACTIVE_FIELD).unwrap_or(false)
}

fn document_id(document: &Document) -> Option<String> {
    match document.get(STORED_ID_FIELD)? {
        Bson::String(id) => Some(id.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

/// Resolve a possibly dotted path inside a document.
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }
    Some(current)
}

fn matches_query(document: &Document, query: &Query) -> AppResult<bool> {
    for condition in &query.conditions {
        if !matches_condition(document, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_condition(document: &Document, condition: &FilterField) -> AppResult<bool> {
    let path = match condition.field.as_str() {
        "" => return Err(AppError::validation("Filter field must not be empty")),
        name if name.starts_with('$') => {
            return Err(AppError::validation(format!("Invalid filter field '{name}'")));
        }
        ID_FIELD => STORED_ID_FIELD,
        name => name,
    };
    let actual = lookup(document, path).filter(|v| !matches!(v, Bson::Null));
    let expected = to_bson(&condition.value);
    let ordering = || compare_bson(actual, Some(&expected));

    Ok(match condition.op {
        FilterOp::Eq => actual.is_some() && ordering().is_eq(),
        FilterOp::Ne => actual.is_none() || ordering().is_ne(),
        FilterOp::Gt => actual.is_some() && ordering().is_gt(),
        FilterOp::Gte => actual.is_some() && ordering().is_ge(),
        FilterOp::Lt => actual.is_some() && ordering().is_lt(),
        FilterOp::Lte => actual.is_some() && ordering().is_le(),
        FilterOp::Contains => match &condition.value {
            FilterValue::String(needle) => matches!(
                actual,
                Some(Bson::String(v)) if v.to_lowercase().contains(&needle.to_lowercase())
            ),
            _ => {
                return Err(AppError::validation(format!(
                    "Filter on '{path}' requires a string value"
                )));
            }
        },
        FilterOp::In => {
            let candidates = match &expected {
                Bson::Array(values) => values.clone(),
                single => vec![single.clone()],
            };
            actual.is_some()
                && candidates
                    .iter()
                    .any(|c| compare_bson(actual, Some(c)).is_eq())
        }
        FilterOp::IsNull => actual.is_none(),
        FilterOp::IsNotNull => actual.is_some(),
    })
}
