//! Translation of search keys and [`Query`] values into filter documents.

use mongodb::bson::{Bson, Document, doc};

use crudhub_core::error::AppError;
use crudhub_core::types::metadata::{ID_FIELD, STORED_ID_FIELD};
use crudhub_core::types::{EntityMetadata, FilterField, FilterOp, FilterValue, Query};

/// Case-insensitive literal substring match for `needle`.
fn contains(needle: &str) -> Document {
    doc! { "$regex": regex::escape(needle), "$options": "i" }
}

/// Filter matching `key` as a substring of any searchable field.
///
/// An entity without searchable fields yields a filter that matches nothing.
pub fn search_filter(metadata: &EntityMetadata, key: &str) -> Document {
    let clauses: Vec<Document> = metadata
        .searchable_fields()
        .map(|field| doc! { field.stored_name(): contains(key) })
        .collect();

    if clauses.is_empty() {
        return doc! { STORED_ID_FIELD: { "$in": [] } };
    }
    doc! { "$or": clauses }
}

/// Filter matching any of the given ids.
pub fn ids_filter(ids: &[String]) -> Document {
    doc! { STORED_ID_FIELD: { "$in": ids.to_vec() } }
}

/// Translate a conjunction of conditions into a filter document.
pub fn query_filter(query: &Query) -> Result<Document, AppError> {
    let mut clauses = query
        .conditions
        .iter()
        .map(condition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    })
}

fn condition(field: &FilterField) -> Result<Document, AppError> {
    let path = match field.field.as_str() {
        "" => return Err(AppError::validation("Filter field must not be empty")),
        name if name.starts_with('$') => {
            return Err(AppError::validation(format!(
                "Invalid filter field '{name}'"
            )));
        }
        ID_FIELD => STORED_ID_FIELD,
        name => name,
    };

    let value = to_bson(&field.value);
    let clause = match field.op {
        FilterOp::Eq => doc! { path: value },
        FilterOp::Ne => doc! { path: { "$ne": value } },
        FilterOp::Gt => doc! { path: { "$gt": value } },
        FilterOp::Gte => doc! { path: { "$gte": value } },
        FilterOp::Lt => doc! { path: { "$lt": value } },
        FilterOp::Lte => doc! { path: { "$lte": value } },
        FilterOp::Contains => match &field.value {
            FilterValue::String(needle) => doc! { path: contains(needle) },
            _ => {
                return Err(AppError::validation(format!(
                    "Filter on '{path}' requires a string value"
                )));
            }
        },
        FilterOp::In => match value {
            Bson::Array(values) => doc! { path: { "$in": values } },
            single => doc! { path: { "$in": [single] } },
        },
        FilterOp::IsNull => doc! { path: Bson::Null },
        FilterOp::IsNotNull => doc! { path: { "$ne": Bson::Null } },
    };
    Ok(clause)
}

/// Convert a filter value into its BSON form.
pub fn to_bson(value: &FilterValue) -> Bson {
    match value {
        FilterValue::String(s) => Bson::String(s.clone()),
        FilterValue::Integer(i) => Bson::Int64(*i),
        FilterValue::Float(f) => Bson::Double(*f),
        FilterValue::Boolean(b) => Bson::Boolean(*b),
        FilterValue::StringList(values) => {
            Bson::Array(values.iter().cloned().map(Bson::String).collect())
        }
        FilterValue::Timestamp(at) => Bson::DateTime(bson::DateTime::from_chrono(*at)),
        FilterValue::Null => Bson::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudhub_core::types::FieldDescriptor;

    fn metadata(fields: Vec<FieldDescriptor>) -> EntityMetadata {
        EntityMetadata::build("things", fields, false).unwrap()
    }

    #[test]
    fn test_search_filter_ors_searchable_fields() {
        let meta = metadata(vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::number("age"),
            FieldDescriptor::text("code"),
        ]);
        let filter = search_filter(&meta, "foo");
        assert_eq!(
            filter,
            doc! { "$or": [
                { "name": { "$regex": "foo", "$options": "i" } },
                { "code": { "$regex": "foo", "$options": "i" } },
            ] }
        );
    }

    #[test]
    fn test_search_key_is_escaped() {
        let meta = metadata(vec![FieldDescriptor::text("name")]);
        let filter = search_filter(&meta, "a.b(c");
        let clause = filter.get_array("$or").unwrap()[0].as_document().unwrap();
        let pattern = clause
            .get_document("name")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(pattern, r"a\.b\(c");
    }

    #[test]
    fn test_search_without_searchable_fields_matches_nothing() {
        let meta = metadata(vec![FieldDescriptor::number("age")]);
        assert_eq!(
            search_filter(&meta, "foo"),
            doc! { "_id": { "$in": [] } }
        );
    }

    #[test]
    fn test_query_filter_combines_conditions() {
        let query = Query::new()
            .and(FilterField::eq("id", "abc"))
            .and(FilterField::new(
                "age",
                FilterOp::Gte,
                FilterValue::Integer(18),
            ));
        assert_eq!(
            query_filter(&query).unwrap(),
            doc! { "$and": [{ "_id": "abc" }, { "age": { "$gte": 18_i64 } }] }
        );
    }

    #[test]
    fn test_query_filter_single_and_empty() {
        assert_eq!(query_filter(&Query::new()).unwrap(), Document::new());
        let query = Query::from(FilterField::any_of("code", vec!["A".into(), "B".into()]));
        assert_eq!(
            query_filter(&query).unwrap(),
            doc! { "code": { "$in": ["A", "B"] } }
        );
    }

    #[test]
    fn test_query_filter_rejects_operator_fields() {
        let query = Query::from(FilterField::eq("$where", "1"));
        assert!(query_filter(&query).is_err());
        let query = Query::from(FilterField::new(
            "name",
            FilterOp::Contains,
            FilterValue::Integer(3),
        ));
        assert!(query_filter(&query).is_err());
    }
}
