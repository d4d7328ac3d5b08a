//! Entry point for spreadsheet export and import.

use std::cmp::Ordering;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ExcelError;
use crate::reader::{open_range, rows_to_records};
use crate::writer::{collect_headers, flatten_records, order_headers, write_workbook};

/// MIME type used for spreadsheet content negotiation.
pub const EXCEL_MEDIA_TYPE: &str = "application/vnd.ms-excel";

/// Converts record lists to `.xlsx` workbooks and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelService;

impl ExcelService {
    /// Creates a new spreadsheet service.
    pub fn new() -> Self {
        Self
    }

    /// Write `records` to a single-sheet workbook named after `entity_name`.
    ///
    /// Columns appear in first-seen order across all records.
    pub fn create_excel<T: Serialize>(
        &self,
        records: &[T],
        entity_name: &str,
    ) -> Result<Vec<u8>, ExcelError> {
        let flat = flatten_records(records)?;
        let headers = collect_headers(&flat);
        debug!(entity = entity_name, rows = flat.len(), columns = headers.len(), "Creating workbook");
        write_workbook(entity_name, &headers, &flat)
    }

    /// Like [`create_excel`](Self::create_excel) with columns sorted by `compare`.
    pub fn create_excel_ordered<T, F>(
        &self,
        records: &[T],
        entity_name: &str,
        compare: F,
    ) -> Result<Vec<u8>, ExcelError>
    where
        T: Serialize,
        F: FnMut(&str, &str) -> Ordering,
    {
        let flat = flatten_records(records)?;
        let mut headers = collect_headers(&flat);
        order_headers(&mut headers, compare);
        write_workbook(entity_name, &headers, &flat)
    }

    /// Parse a workbook into typed records.
    ///
    /// The first row holds column names; blank rows are skipped.
    pub fn read_excel<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        entity_name: &str,
    ) -> Result<Vec<T>, ExcelError> {
        let range = open_range(bytes, entity_name)?;
        let records = rows_to_records(&range)?;
        debug!(entity = entity_name, rows = records.len(), "Parsed workbook");
        Ok(records)
    }
}
