//! Declared field tables for entity types.
//!
//! Every entity declares its fields once. The table drives free-text search
//! (which fields are searched), sort resolution (which keys are legal, which
//! are references into another collection) and case-insensitive ordering
//! (which fields are text).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::traits::entity::Entity;
use crate::types::audit::AuditFields;

/// Name of the document id field as exposed to callers.
pub const ID_FIELD: &str = "id";
/// Name of the document id field as stored.
pub const STORED_ID_FIELD: &str = "_id";
/// Name of the soft-delete flag.
pub const ACTIVE_FIELD: &str = "active";

/// The value type of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// A string value; compared case-insensitively when sorting.
    Text,
    /// A numeric value.
    Number,
    /// A boolean value.
    Boolean,
    /// A timestamp.
    Date,
    /// A `{ "$ref", "$id" }` link into another collection.
    Reference {
        /// Target collection name.
        collection: String,
    },
}

/// One declared entity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as stored.
    pub name: String,
    /// Value type.
    pub kind: FieldKind,
    /// Whether free-text search includes this field.
    pub searchable: bool,
}

impl FieldDescriptor {
    /// A searchable text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            searchable: true,
        }
    }

    /// A numeric field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::plain(name, FieldKind::Number)
    }

    /// A boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::plain(name, FieldKind::Boolean)
    }

    /// A timestamp field.
    pub fn date(name: impl Into<String>) -> Self {
        Self::plain(name, FieldKind::Date)
    }

    /// A reference into `collection`.
    pub fn reference(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::plain(
            name,
            FieldKind::Reference {
                collection: collection.into(),
            },
        )
    }

    /// Override whether free-text search includes this field.
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// The stored path for this field (`id` maps to `_id`).
    pub fn stored_name(&self) -> &str {
        if self.name == ID_FIELD {
            STORED_ID_FIELD
        } else {
            &self.name
        }
    }

    /// Whether the value is compared case-insensitively.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, FieldKind::Text)
    }

    /// The referenced collection, if this is a reference field.
    pub fn reference_collection(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Reference { collection } => Some(collection),
            _ => None,
        }
    }

    fn plain(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            searchable: false,
        }
    }
}

/// The validated field table of one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Collection the entity is stored in.
    pub collection: String,
    /// Declared fields followed by the base fields.
    pub fields: Vec<FieldDescriptor>,
}

impl EntityMetadata {
    /// Build and validate the table declared by `E`.
    pub fn for_entity<E: Entity>() -> Result<Self, AppError> {
        Self::build(E::COLLECTION, E::fields(), E::AUDITED)
    }

    /// Build and validate a table from its parts.
    pub fn build(
        collection: &str,
        declared: Vec<FieldDescriptor>,
        audited: bool,
    ) -> Result<Self, AppError> {
        if collection.trim().is_empty() {
            return Err(AppError::configuration(
                "Entity collection name must not be empty",
            ));
        }

        let base = base_fields(audited);
        let reserved: HashSet<&str> = base
            .iter()
            .map(|f| f.name.as_str())
            .chain([STORED_ID_FIELD, ACTIVE_FIELD])
            .chain(AuditFields::FIELD_NAMES)
            .collect();

        let mut seen = HashSet::new();
        for field in &declared {
            let name = field.name.as_str();
            if name.is_empty() || name.contains('.') || name.starts_with('$') {
                return Err(AppError::configuration(format!(
                    "Invalid field name '{name}' on collection '{collection}'"
                )));
            }
            if reserved.contains(name) {
                return Err(AppError::configuration(format!(
                    "Field '{name}' on collection '{collection}' collides with a base field"
                )));
            }
            if !seen.insert(name) {
                return Err(AppError::configuration(format!(
                    "Field '{name}' declared twice on collection '{collection}'"
                )));
            }
            if let Some(target) = field.reference_collection() {
                if target.trim().is_empty() {
                    return Err(AppError::configuration(format!(
                        "Reference field '{name}' on collection '{collection}' has no target collection"
                    )));
                }
            }
        }

        let mut fields = declared;
        fields.extend(base);
        Ok(Self {
            collection: collection.to_string(),
            fields,
        })
    }

    /// Look up a field (declared or base) by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields included in free-text search.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.searchable)
    }

    /// Fields linking into other collections.
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.reference_collection().is_some())
    }
}

fn base_fields(audited: bool) -> Vec<FieldDescriptor> {
    let mut fields = vec![
        FieldDescriptor::text(ID_FIELD).with_searchable(false),
        FieldDescriptor::boolean(ACTIVE_FIELD),
    ];
    if audited {
        fields.extend([
            FieldDescriptor::text("created_by").with_searchable(false),
            FieldDescriptor::date("created_date"),
            FieldDescriptor::text("last_modified_by").with_searchable(false),
            FieldDescriptor::date("last_modified_date"),
        ]);
    }
    fields
}
