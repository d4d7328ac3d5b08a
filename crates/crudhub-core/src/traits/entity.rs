//! The persisted entity contract.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::audit::{AuditFields, Auditor};
use crate::types::metadata::FieldDescriptor;

/// A soft-deletable document stored in its own collection.
///
/// Implementations are normally generated with `crudhub_entity::impl_entity!`.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Collection the entity is stored in.
    const COLLECTION: &'static str;
    /// Human-readable entity name (worksheet and download names).
    const NAME: &'static str;
    /// Whether the entity carries [`AuditFields`].
    const AUDITED: bool = false;

    /// Declared fields, excluding the base fields.
    fn fields() -> Vec<FieldDescriptor>;

    /// The document id, absent until first saved.
    fn id(&self) -> Option<&str>;

    /// Assign the document id.
    fn set_id(&mut self, id: String);

    /// Soft-delete flag.
    fn is_active(&self) -> bool;

    /// Set the soft-delete flag.
    fn set_active(&mut self, active: bool);

    /// Mutable access to the audit stamps, wherever the entity keeps them.
    fn audit_mut(&mut self) -> Option<&mut AuditFields> {
        None
    }

    /// Whether the entity has never been persisted.
    fn is_new(&self) -> bool {
        self.id().is_none_or(str::is_empty)
    }

    /// Stamp modification fields, plus creation fields when `created`.
    fn stamp_audit(&mut self, auditor: &Auditor, created: bool) {
        if let Some(audit) = self.audit_mut() {
            let now = Utc::now();
            if created {
                audit.stamp_created(auditor, now);
            }
            audit.stamp_modified(auditor, now);
        }
    }
}
