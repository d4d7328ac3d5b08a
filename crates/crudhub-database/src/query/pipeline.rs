//! The aggregation pipeline used for case-insensitive field ordering.
//!
//! Each sort key is projected next to the original document as a synthetic
//! field (lower-cased for text fields) so the server can sort on it.

use mongodb::bson::{Bson, Document, doc};

use crudhub_core::types::PageRequest;
use crudhub_core::types::metadata::STORED_ID_FIELD;

use super::sort::FieldSort;

/// Field holding the original document in projected results.
pub const ROOT_FIELD: &str = "doc";

/// Name of the synthetic sort field for the key at `index`.
pub fn sort_key_name(index: usize) -> String {
    format!("sort_key_{index}")
}

/// Build `$match`, `$project`, `$sort` and optional `$skip`/`$limit` stages.
///
/// The original `_id` is appended as a final ascending key unless already
/// sorted on, so pages do not overlap between requests.
pub fn sort_pipeline(
    filter: Document,
    keys: &[FieldSort],
    page: Option<&PageRequest>,
) -> Vec<Document> {
    let mut projection = doc! { ROOT_FIELD: "$$ROOT" };
    let mut sort = Document::new();

    for (index, key) in keys.iter().enumerate() {
        let name = sort_key_name(index);
        let source = format!("${}", key.path);
        let value = if key.text {
            Bson::Document(doc! { "$toLower": source })
        } else {
            Bson::String(source)
        };
        projection.insert(name.clone(), value);
        sort.insert(name, key.direction.as_mongo());
    }
    if !keys.iter().any(|k| k.path == STORED_ID_FIELD) {
        sort.insert(format!("{ROOT_FIELD}.{STORED_ID_FIELD}"), 1);
    }

    let mut pipeline = vec![
        doc! { "$match": filter },
        doc! { "$project": projection },
        doc! { "$sort": sort },
    ];
    if let Some(page) = page {
        pipeline.push(doc! { "$skip": to_i64(page.offset()) });
        pipeline.push(doc! { "$limit": to_i64(page.limit()) });
    }
    pipeline
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
