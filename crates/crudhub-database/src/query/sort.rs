//! Resolution of requested sort keys against an entity's field table.

use crudhub_core::error::AppError;
use crudhub_core::types::metadata::{ID_FIELD, STORED_ID_FIELD};
use crudhub_core::types::{EntityMetadata, SortDirection, SortField};

/// Sort on a field stored in the entity's own collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSort {
    /// Stored field path.
    pub path: String,
    /// Whether the value is lower-cased before comparison.
    pub text: bool,
    /// Requested direction.
    pub direction: SortDirection,
}

/// Sort on a field of the document a reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSort {
    /// Reference field on the primary entity.
    pub field: String,
    /// Collection the reference points into.
    pub collection: String,
    /// Field path inside the referenced document.
    pub sub_path: String,
    /// Requested direction.
    pub direction: SortDirection,
}

/// One resolved sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// A field of the entity itself.
    Field(FieldSort),
    /// A field reached through a reference.
    Relation(RelationSort),
}

/// The ordered list of resolved sort keys for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortPlan {
    keys: Vec<SortKey>,
}

impl SortPlan {
    /// Resolve every requested key, rejecting unknown or invalid ones.
    pub fn resolve(metadata: &EntityMetadata, sort: &[SortField]) -> Result<Self, AppError> {
        let keys = sort
            .iter()
            .map(|s| resolve_key(metadata, s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { keys })
    }

    /// The resolved keys in request order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Whether no ordering was requested.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether any key goes through a reference.
    pub fn has_relation(&self) -> bool {
        self.keys.iter().any(|k| matches!(k, SortKey::Relation(_)))
    }

    /// The field keys, when the plan has no relation keys.
    pub fn field_keys(&self) -> Option<Vec<FieldSort>> {
        self.keys
            .iter()
            .map(|k| match k {
                SortKey::Field(f) => Some(f.clone()),
                SortKey::Relation(_) => None,
            })
            .collect()
    }
}

fn resolve_key(metadata: &EntityMetadata, sort: &SortField) -> Result<SortKey, AppError> {
    let (root, sub_path) = match sort.field.split_once('.') {
        Some((root, rest)) => (root, Some(rest)),
        None => (sort.field.as_str(), None),
    };

    let field = metadata.field(root).ok_or_else(|| {
        AppError::validation(format!(
            "Unknown sort field '{}' for {}",
            sort.field, metadata.collection
        ))
    })?;

    match (field.reference_collection(), sub_path) {
        (Some(collection), sub_path) => {
            let sub_path = match sub_path {
                None | Some(ID_FIELD) => STORED_ID_FIELD,
                Some("") => {
                    return Err(AppError::validation(format!(
                        "Invalid sort field '{}'",
                        sort.field
                    )));
                }
                Some(path) => path,
            };
            Ok(SortKey::Relation(RelationSort {
                field: field.name.clone(),
                collection: collection.to_string(),
                sub_path: sub_path.to_string(),
                direction: sort.direction,
            }))
        }
        (None, None) => Ok(SortKey::Field(FieldSort {
            path: field.stored_name().to_string(),
            text: field.is_text() && field.name != ID_FIELD,
            direction: sort.direction,
        })),
        (None, Some(_)) => Err(AppError::validation(format!(
            "Sort field '{}' does not go through a reference",
            sort.field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudhub_core::error::ErrorKind;
    use crudhub_core::types::FieldDescriptor;

    fn metadata() -> EntityMetadata {
        EntityMetadata::build(
            "contacts",
            vec![
                FieldDescriptor::text("name"),
                FieldDescriptor::number("age"),
                FieldDescriptor::reference("tenant", "tenants"),
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_field_sorts() {
        let plan = SortPlan::resolve(
            &metadata(),
            &[SortField::asc("name"), SortField::desc("age"), SortField::asc("id")],
        )
        .unwrap();
        assert!(!plan.has_relation());
        let keys = plan.field_keys().unwrap();
        assert_eq!(keys[0].path, "name");
        assert!(keys[0].text);
        assert!(!keys[1].text);
        assert_eq!(keys[1].direction, SortDirection::Desc);
        assert_eq!(keys[2].path, "_id");
        assert!(!keys[2].text);
    }

    #[test]
    fn test_relation_sort() {
        let plan = SortPlan::resolve(&metadata(), &[SortField::desc("tenant.name")]).unwrap();
        assert!(plan.has_relation());
        assert!(plan.field_keys().is_none());
        assert_eq!(
            plan.keys()[0],
            SortKey::Relation(RelationSort {
                field: "tenant".into(),
                collection: "tenants".into(),
                sub_path: "name".into(),
                direction: SortDirection::Desc,
            })
        );
    }

    #[test]
    fn test_bare_reference_sorts_by_referenced_id() {
        let plan = SortPlan::resolve(&metadata(), &[SortField::asc("tenant")]).unwrap();
        match &plan.keys()[0] {
            SortKey::Relation(r) => assert_eq!(r.sub_path, "_id"),
            other => panic!("unexpected key {other:?}"),
        }
    }

    #[test]
    fn test_invalid_keys_rejected() {
        for key in ["missing", "name.first", "tenant.", "age.value"] {
            let err = SortPlan::resolve(&metadata(), &[SortField::asc(key)]).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "key {key}");
        }
    }

    #[test]
    fn test_empty_plan() {
        let plan = SortPlan::resolve(&metadata(), &[]).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.field_keys(), Some(vec![]));
    }
}
