//! Workbook parsing.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::ExcelError;
use crate::flatten::insert_path;
use crate::writer::sheet_name;

/// Open the sheet named after the entity, or the first sheet.
pub(crate) fn open_range(bytes: &[u8], entity_name: &str) -> Result<Range<Data>, ExcelError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let preferred = sheet_name(entity_name);

    if workbook.sheet_names().iter().any(|name| *name == preferred) {
        return Ok(workbook.worksheet_range(&preferred)?);
    }

    match workbook.worksheet_range_at(0) {
        Some(range) => Ok(range?),
        None => Err(ExcelError::NoWorksheet),
    }
}

/// Convert a worksheet range into typed records.
pub(crate) fn rows_to_records<T: DeserializeOwned>(range: &Range<Data>) -> Result<Vec<T>, ExcelError> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<Option<String>> = header_row.iter().map(header_text).collect();

    let mut records = Vec::new();
    for (offset, row) in rows.enumerate() {
        let mut object = Map::new();
        let mut literal = Map::new();
        let mut decoded = false;
        for (cell, header) in row.iter().zip(&headers) {
            let (Some(header), Some(value)) = (header, cell_value(cell)) else {
                continue;
            };
            match json_list(&value) {
                Some(list) => {
                    insert_path(&mut object, header, list);
                    decoded = true;
                }
                None => insert_path(&mut object, header, value.clone()),
            }
            insert_path(&mut literal, header, value);
        }
        if object.is_empty() {
            continue;
        }
        // Header occupies row 1 of the sheet.
        let row_number = offset + 2;
        let record = match serde_json::from_value(Value::Object(object)) {
            Ok(record) => record,
            // A text field whose content merely looks like a list.
            Err(source) if decoded => serde_json::from_value(Value::Object(literal))
                .map_err(|_| ExcelError::Row { row: row_number, source })?,
            Err(source) => return Err(ExcelError::Row { row: row_number, source }),
        };
        records.push(record);
    }
    Ok(records)
}

/// A list the writer stored as JSON text.
fn json_list(value: &Value) -> Option<Value> {
    let text = value.as_str()?.trim();
    if !(text.starts_with('[') && text.ends_with(']')) {
        return None;
    }
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_array)
}

fn header_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => return None,
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Cell to JSON. Empty and error cells yield `None`.
pub(crate) fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Float(f) => float_value(*f),
        Data::DateTime(dt) => float_value(dt.as_f64()),
    }
}

fn float_value(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Some(Value::Number((f as i64).into()));
    }
    Number::from_f64(f).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_whole_float_becomes_integer() {
        assert_eq!(cell_value(&Data::Float(3.0)), Some(json!(3)));
        assert_eq!(cell_value(&Data::Float(2.5)), Some(json!(2.5)));
        assert_eq!(cell_value(&Data::Int(7)), Some(json!(7)));
    }

    #[test]
    fn test_cell_value_empty_cells_omitted() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::String(String::new())), None);
        assert_eq!(cell_value(&Data::Bool(true)), Some(json!(true)));
    }

    #[test]
    fn test_json_list_only_for_array_text() {
        assert_eq!(json_list(&json!(r#"["a","b"]"#)), Some(json!(["a", "b"])));
        assert_eq!(json_list(&json!("[draft] notes")), None);
        assert_eq!(json_list(&json!(3)), None);
    }

    #[test]
    fn test_header_text_trims() {
        assert_eq!(header_text(&Data::String(" name ".into())), Some("name".into()));
        assert_eq!(header_text(&Data::Empty), None);
    }
}
