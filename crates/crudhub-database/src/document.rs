//! Conversions between entities and stored documents shared by the
//! repository implementations.

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document, doc};

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::Entity;
use crudhub_core::types::metadata::ACTIVE_FIELD;
use crudhub_core::types::{AuditFields, Auditor};

/// Creation stamp fields, written only when a document is first stored.
pub const CREATED_FIELDS: [&str; 2] = ["created_by", "created_date"];

/// Assign an id when absent, activate, and stamp creation audit.
pub fn prepare_insert<E: Entity>(mut entity: E, auditor: &Auditor) -> E {
    if entity.is_new() {
        entity.set_id(ObjectId::new().to_hex());
    }
    entity.set_active(true);
    entity.stamp_audit(auditor, true);
    entity
}

/// Serialize an entity to its stored shape.
pub fn encode<E: Entity>(entity: &E) -> AppResult<Document> {
    bson::to_document(entity).map_err(|e| {
        AppError::serialization(format!("Failed to encode {} document: {e}", E::NAME))
    })
}

/// Deserialize a stored document.
pub fn decode<E: Entity>(document: Document) -> AppResult<E> {
    bson::from_document(document).map_err(|e| {
        AppError::serialization(format!("Failed to decode {} document: {e}", E::NAME))
    })
}

/// Deserialize many stored documents, failing on the first bad one.
pub fn decode_all<E: Entity>(documents: Vec<Document>) -> AppResult<Vec<E>> {
    documents.into_iter().map(decode::<E>).collect()
}

/// Distinct ids of `entities` in input order.
///
/// An entity without an id is a validation error.
pub fn entity_ids<E: Entity>(entities: &[E]) -> AppResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(entities.len());
    for entity in entities {
        let id = entity.id().filter(|id| !id.is_empty()).ok_or_else(|| {
            AppError::validation(format!("Cannot delete a {} without an id", E::NAME))
        })?;
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Fields written by a soft delete: the flag plus modification audit.
pub fn deactivation_fields<E: Entity>(auditor: &Auditor) -> AppResult<Document> {
    let mut set = doc! { ACTIVE_FIELD: false };
    if E::AUDITED {
        let mut audit = AuditFields::default();
        audit.stamp_modified(auditor, Utc::now());
        set.insert("last_modified_by", audit.last_modified_by);
        set.insert(
            "last_modified_date",
            Bson::DateTime(bson::DateTime::from_chrono(audit.last_modified_date)),
        );
    }
    Ok(set)
}

/// The `$set` update performing a soft delete.
pub fn deactivation<E: Entity>(auditor: &Auditor) -> AppResult<Document> {
    Ok(doc! { "$set": deactivation_fields::<E>(auditor)? })
}
