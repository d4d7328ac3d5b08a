//! In-memory ordering of documents by fields of referenced documents.
//!
//! The referenced collection is queried once per relation key, sorted on
//! the requested sub-field. The resulting order becomes a rank table that
//! primary documents are compared by. References that are missing or do not
//! resolve rank `-1` and therefore come first.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use mongodb::bson::{Bson, Document};

use crudhub_core::types::SortDirection;

/// Key under which a reference stores the target id.
const REF_ID_KEY: &str = "$id";

/// Rank of a reference that is absent or failed to resolve.
pub const UNRESOLVED_RANK: i64 = -1;

/// Position of each referenced id in the sorted referenced collection.
#[derive(Debug, Clone, Default)]
pub struct RankTable {
    ranks: HashMap<String, i64>,
}

impl RankTable {
    /// Build from ids already in the desired order.
    pub fn from_ordered_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut ranks = HashMap::new();
        for (position, id) in ids.into_iter().enumerate() {
            let rank = i64::try_from(position).unwrap_or(i64::MAX);
            ranks.entry(id).or_insert(rank);
        }
        Self { ranks }
    }

    /// Rank of the given reference id.
    pub fn rank(&self, id: Option<&str>) -> i64 {
        id.and_then(|id| self.ranks.get(id).copied())
            .unwrap_or(UNRESOLVED_RANK)
    }
}

/// The id a document's reference field points to.
pub fn reference_id(document: &Document, field: &str) -> Option<String> {
    match document.get_document(field).ok()?.get(REF_ID_KEY)? {
        Bson::String(id) => Some(id.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

/// Distinct reference ids found in `field` across `documents`, in first-seen order.
pub fn collect_reference_ids(documents: &[Document], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter_map(|d| reference_id(d, field))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// One key of the composite in-memory ordering.
#[derive(Debug, Clone)]
pub enum OrderKey {
    /// Compare by the rank of the referenced document.
    Rank {
        /// Reference field on the primary document.
        field: String,
        /// Ranks of the referenced documents, already in the requested direction.
        table: RankTable,
    },
    /// Compare the field values directly, case-insensitively.
    Value {
        /// Stored field path.
        path: String,
        /// Requested direction.
        direction: SortDirection,
    },
}

/// Stable sort of `documents` by all `keys`, in order.
pub fn order_documents(documents: &mut [Document], keys: &[OrderKey]) {
    documents.sort_by(|a, b| {
        keys.iter()
            .map(|key| compare_by(a, b, key))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn compare_by(a: &Document, b: &Document, key: &OrderKey) -> Ordering {
    match key {
        OrderKey::Rank { field, table } => {
            let left = table.rank(reference_id(a, field).as_deref());
            let right = table.rank(reference_id(b, field).as_deref());
            left.cmp(&right)
        }
        OrderKey::Value { path, direction } => {
            direction.apply(compare_bson(a.get(path), b.get(path)))
        }
    }
}

/// Total order over BSON values used for in-memory sorting.
///
/// Missing and null values sort first. Strings compare case-insensitively.
/// Numbers compare numerically across integer and double representations.
pub fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let a = a.filter(|v| !matches!(v, Bson::Null));
    let b = b.filter(|v| !matches!(v, Bson::Null));
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &Bson, b: &Bson) -> Ordering {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => a.cmp(b),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => type_rank(a)
                .cmp(&type_rank(b))
                .then_with(|| a.to_string().cmp(&b.to_string())),
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 1,
        Bson::String(_) | Bson::Symbol(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Binary(_) => 5,
        Bson::ObjectId(_) => 6,
        Bson::Boolean(_) => 7,
        Bson::DateTime(_) | Bson::Timestamp(_) => 8,
        _ => 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn contact(id: &str, name: &str, tenant: Option<&str>) -> Document {
        let mut d = doc! { "_id": id, "name": name };
        if let Some(tenant) = tenant {
            d.insert("tenant", doc! { "$ref": "tenants", "$id": tenant });
        }
        d
    }

    fn ids(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|d| d.get_str("_id").unwrap()).collect()
    }

    #[test]
    fn test_rank_table_unresolved_is_first() {
        let table = RankTable::from_ordered_ids(vec!["b".to_string(), "a".to_string()]);
        assert_eq!(table.rank(Some("b")), 0);
        assert_eq!(table.rank(Some("a")), 1);
        assert_eq!(table.rank(Some("zzz")), UNRESOLVED_RANK);
        assert_eq!(table.rank(None), UNRESOLVED_RANK);
    }

    #[test]
    fn test_collect_reference_ids_distinct() {
        let docs = vec![
            contact("1", "x", Some("t2")),
            contact("2", "y", None),
            contact("3", "z", Some("t2")),
            contact("4", "w", Some("t1")),
        ];
        assert_eq!(collect_reference_ids(&docs, "tenant"), vec!["t2", "t1"]);
    }

    #[test]
    fn test_order_by_rank_then_value() {
        // Tenants sorted by name: t2 ("Acme") before t1 ("Zeta").
        let table = RankTable::from_ordered_ids(vec!["t2".to_string(), "t1".to_string()]);
        let mut docs = vec![
            contact("1", "bob", Some("t1")),
            contact("2", "Carl", Some("t2")),
            contact("3", "alice", Some("t2")),
            contact("4", "dan", None),
            contact("5", "eve", Some("gone")),
        ];
        order_documents(
            &mut docs,
            &[
                OrderKey::Rank {
                    field: "tenant".into(),
                    table,
                },
                OrderKey::Value {
                    path: "name".into(),
                    direction: SortDirection::Asc,
                },
            ],
        );
        assert_eq!(ids(&docs), vec!["4", "5", "3", "2", "1"]);
    }

    #[test]
    fn test_value_order_case_insensitive_desc() {
        let mut docs = vec![
            contact("1", "alpha", None),
            contact("2", "Charlie", None),
            contact("3", "bravo", None),
        ];
        order_documents(
            &mut docs,
            &[OrderKey::Value {
                path: "name".into(),
                direction: SortDirection::Desc,
            }],
        );
        assert_eq!(ids(&docs), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_compare_bson_mixed_numbers_and_nulls() {
        assert_eq!(
            compare_bson(Some(&Bson::Int32(2)), Some(&Bson::Double(2.5))),
            Ordering::Less
        );
        assert_eq!(
            compare_bson(Some(&Bson::Null), Some(&Bson::Int64(0))),
            Ordering::Less
        );
        assert_eq!(compare_bson(None, Some(&Bson::Null)), Ordering::Equal);
    }
}
