//! Lazily resolved references into other collections.

use serde::{Deserialize, Serialize};

use crudhub_core::traits::Entity;
use crudhub_core::types::FieldDescriptor;

use crate::tenant::Tenant;

/// A `{ "$ref": <collection>, "$id": <id> }` link to another document.
///
/// The target is never embedded; readers resolve it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Target collection.
    #[serde(rename = "$ref")]
    pub collection: String,
    /// Target document id.
    #[serde(rename = "$id")]
    pub id: String,
}

impl DocumentRef {
    /// Create a reference to `id` in `collection`.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

/// Mandatory link from a tenant-scoped entity to its owning [`Tenant`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantRef(DocumentRef);

impl TenantRef {
    /// Name of the field holding the reference.
    pub const FIELD: &'static str = "tenant";

    /// Reference the tenant with the given id.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self(DocumentRef::new(Tenant::COLLECTION, tenant_id))
    }

    /// The referenced tenant id.
    pub fn tenant_id(&self) -> &str {
        &self.0.id
    }

    /// The underlying document reference.
    pub fn reference(&self) -> &DocumentRef {
        &self.0
    }

    /// Metadata entry for the `tenant` field.
    pub fn descriptor() -> FieldDescriptor {
        FieldDescriptor::reference(Self::FIELD, Tenant::COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_ref_shape() {
        let json = serde_json::to_value(TenantRef::new("t1")).unwrap();
        assert_eq!(json, serde_json::json!({ "$ref": "tenants", "$id": "t1" }));
    }

    #[test]
    fn test_tenant_descriptor_is_reference() {
        let field = TenantRef::descriptor();
        assert_eq!(field.name, "tenant");
        assert_eq!(field.reference_collection(), Some("tenants"));
    }
}
