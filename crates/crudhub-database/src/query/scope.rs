//! The soft-delete scope applied to every default read.

use mongodb::bson::{Document, doc};

use crudhub_core::types::metadata::ACTIVE_FIELD;

/// The predicate selecting active documents.
pub fn active_predicate() -> Document {
    doc! { ACTIVE_FIELD: true }
}

/// Restrict `filter` to active documents.
pub fn active_only(filter: Document) -> Document {
    if filter.is_empty() {
        active_predicate()
    } else {
        doc! { "$and": [active_predicate(), filter] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_is_predicate() {
        assert_eq!(active_only(Document::new()), doc! { "active": true });
    }

    #[test]
    fn test_filter_is_wrapped() {
        let scoped = active_only(doc! { "name": "x" });
        assert_eq!(
            scoped,
            doc! { "$and": [{ "active": true }, { "name": "x" }] }
        );
    }
}
