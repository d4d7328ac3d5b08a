//! Workbook generation.

use std::cmp::Ordering;

use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;

use crate::error::ExcelError;
use crate::flatten::flatten;

/// Maximum length Excel accepts for a worksheet name.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Characters Excel rejects in a worksheet name.
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A record flattened into `(column, value)` pairs.
pub(crate) type FlatRecord = Vec<(String, Value)>;

/// Derive a valid worksheet name from an entity name.
pub fn sheet_name(entity_name: &str) -> String {
    let cleaned: String = entity_name
        .trim()
        .trim_matches('\'')
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// Union of column names across all records, in first-seen order.
pub(crate) fn collect_headers(records: &[FlatRecord]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for (column, _) in record {
            if !headers.iter().any(|h| h == column) {
                headers.push(column.clone());
            }
        }
    }
    headers
}

/// Serialize and flatten every record, rejecting non-object values.
pub(crate) fn flatten_records<T: serde::Serialize>(
    records: &[T],
) -> Result<Vec<FlatRecord>, ExcelError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            match serde_json::to_value(record).map_err(ExcelError::Serialize)? {
                Value::Object(object) => Ok(flatten(&object)),
                _ => Err(ExcelError::NotAnObject { index }),
            }
        })
        .collect()
}

/// Write a header row followed by one row per record.
pub(crate) fn write_workbook(
    entity_name: &str,
    headers: &[String],
    records: &[FlatRecord],
) -> Result<Vec<u8>, ExcelError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(entity_name))?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, column_index(col)?, header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = u32::try_from(index + 1).map_err(|_| ExcelError::TooLarge("rows"))?;
        for (column, value) in record {
            let Some(col) = headers.iter().position(|h| h == column) else {
                continue;
            };
            write_cell(worksheet, row, column_index(col)?, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Sort headers with a caller-provided comparator.
pub(crate) fn order_headers<F>(headers: &mut [String], mut compare: F)
where
    F: FnMut(&str, &str) -> Ordering,
{
    headers.sort_by(|a, b| compare(a, b));
}

fn column_index(col: usize) -> Result<u16, ExcelError> {
    u16::try_from(col).map_err(|_| ExcelError::TooLarge("columns"))
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), ExcelError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(number) => {
                worksheet.write_number(row, col, number)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Value::Array(_) | Value::Object(_) => {
            worksheet.write_string(row, col, value.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sheet_name_truncates_and_cleans() {
        assert_eq!(sheet_name("Tenant"), "Tenant");
        assert_eq!(sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sheet_name(""), "Sheet1");
        let long = "x".repeat(40);
        assert_eq!(sheet_name(&long).chars().count(), MAX_SHEET_NAME_CHARS);
    }

    #[test]
    fn test_collect_headers_first_seen_order() {
        let records = flatten_records(&[
            json!({ "name": "a", "code": "A" }),
            json!({ "code": "B", "extra": 1, "tenant": { "$id": "t1" } }),
        ])
        .unwrap();
        assert_eq!(
            collect_headers(&records),
            vec!["name", "code", "extra", "tenant.$id"]
        );
    }

    #[test]
    fn test_flatten_records_rejects_scalars() {
        let err = flatten_records(&[json!({ "a": 1 }), json!(3)]).unwrap_err();
        assert!(matches!(err, ExcelError::NotAnObject { index: 1 }));
    }

    #[test]
    fn test_order_headers_with_comparator() {
        let mut headers = vec!["name".to_string(), "code".to_string(), "id".to_string()];
        order_headers(&mut headers, |a, b| a.cmp(b));
        assert_eq!(headers, vec!["code", "id", "name"]);
    }
}
