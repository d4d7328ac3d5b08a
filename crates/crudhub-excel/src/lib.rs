//! # crudhub-excel
//!
//! Conversion between lists of serializable records and `.xlsx` workbooks.
//! Records become rows; nested objects are flattened into dotted column
//! names on export and re-nested on import.

pub mod error;
pub mod flatten;
pub mod reader;
pub mod service;
pub mod writer;

pub use error::ExcelError;
pub use service::{EXCEL_MEDIA_TYPE, ExcelService};
