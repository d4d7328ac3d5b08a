//! Spreadsheet error type.

use thiserror::Error;

use crudhub_core::error::{AppError, ErrorKind};

/// Any failure while producing or parsing a workbook.
#[derive(Debug, Error)]
pub enum ExcelError {
    /// A record did not serialize to a JSON object.
    #[error("Record {index} is not an object")]
    NotAnObject {
        /// Zero-based record position.
        index: usize,
    },
    /// A record could not be serialized.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
    /// A row could not be deserialized into the target type.
    #[error("Invalid row {row}: {source}")]
    Row {
        /// One-based worksheet row number.
        row: usize,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },
    /// The workbook could not be written.
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    /// The workbook could not be opened or a sheet could not be read.
    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),
    /// The workbook contains no worksheet.
    #[error("Workbook has no worksheet")]
    NoWorksheet,
    /// The data does not fit into a worksheet.
    #[error("Too many {0} for a worksheet")]
    TooLarge(&'static str),
}

impl From<ExcelError> for AppError {
    fn from(err: ExcelError) -> Self {
        AppError::with_source(ErrorKind::Excel, err.to_string(), err)
    }
}
