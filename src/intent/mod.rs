//! Query intent types (noun module)
//!
//! The untrusted, interpreter-produced description of what to query, and
//! the closed vocabularies it draws from.

mod extract;
mod lenient;
mod request;
mod types;

pub use extract::extract_json;
pub use request::{Dimension, Filter, Metric, OrderSpec, QueryIntent, TimeFilter};
pub use types::{Aggregate, ChartType, FilterOperator, Granularity, SortDirection, TimeFilterKind, UnknownVariant};
