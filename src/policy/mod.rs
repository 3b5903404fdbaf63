//! Access policy (noun module)
//!
//! The port through which the compiler asks an external authorization
//! service what a caller may see, plus a YAML-declared implementation.

mod port;
mod static_policy;

pub use port::{AccessDecision, AccessPolicy, CallerContext};
pub use static_policy::{RowFilter, StaticPolicy, TablePolicy};
