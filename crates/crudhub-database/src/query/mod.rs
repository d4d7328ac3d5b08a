//! Pure query construction: filters, sort plans, aggregation pipelines,
//! and in-memory relation ordering.

pub mod filter;
pub mod pipeline;
pub mod relation;
pub mod scope;
pub mod sort;

pub use filter::{ids_filter, query_filter, search_filter};
pub use pipeline::sort_pipeline;
pub use relation::{RankTable, order_documents};
pub use scope::active_only;
pub use sort::{FieldSort, RelationSort, SortKey, SortPlan};
