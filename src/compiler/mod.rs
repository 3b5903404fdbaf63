//! Query compiler (verb module)
//!
//! QueryIntent + AccessDecision → CompileResult (parameterized SQL and an
//! audit trail of every predicate applied).

mod clauses;
mod compile;
mod error;
mod result;

pub use compile::{compile, QueryCompiler};
pub use error::CompileError;
pub use result::{ColumnKind, CompileResult, FilterCategory, OutputColumn};
