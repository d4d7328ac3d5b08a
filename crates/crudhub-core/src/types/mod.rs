//! Core type definitions used across the CrudHub workspace.

pub mod audit;
pub mod filter;
pub mod metadata;
pub mod pagination;
pub mod sorting;

pub use audit::{AuditFields, Auditor};
pub use filter::{FilterField, FilterOp, FilterValue, Query};
pub use metadata::{EntityMetadata, FieldDescriptor, FieldKind};
pub use pagination::{PageRequest, PageResponse};
pub use sorting::{SortDirection, SortField};
