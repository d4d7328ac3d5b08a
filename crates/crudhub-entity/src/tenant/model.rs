//! Tenant entity model.

use serde::{Deserialize, Serialize};

use crudhub_core::types::{AuditFields, FieldDescriptor};

use crate::base::SoftDelete;
use crate::impl_entity;

/// An owning organisation that tenant-scoped entities reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Identity and soft-delete flag.
    #[serde(flatten)]
    pub base: SoftDelete,
    /// Creation and modification stamps.
    #[serde(flatten)]
    pub audit: AuditFields,
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
}

impl Tenant {
    /// Create a new, unsaved tenant.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            base: SoftDelete::default(),
            audit: AuditFields::default(),
            name: name.into(),
            code: code.into(),
        }
    }
}

impl_entity!(Tenant {
    collection: "tenants",
    name: "Tenant",
    base: base,
    audit: audit,
    fields: [FieldDescriptor::text("name"), FieldDescriptor::text("code")],
});
