//! intentql - Compile untrusted query intents into tenant-isolated SQL
//!
//! This library provides:
//! - Query intent types, read defensively from interpreter-produced JSON
//! - An access policy port (table/field allowlists, row-level predicates)
//!   and a YAML-declared implementation of it
//! - Time window and filter predicate rendering with safe literal escaping
//! - Query compilation: authorization, parameterized SQL, audit trail
//! - Chart hints for the presentation layer
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `intent/` - query intent types and closed vocabularies
//! - `policy/` - caller identity, access policy port, static policy
//! - `config` - operator settings (tenant column, defaults, limits)
//!
//! **Verb modules** (transformations):
//! - `parser/` - JSON/YAML → QueryIntent, StaticPolicy, CompilerConfig
//! - `predicate/` - TimeFilter/Filter → SQL boolean fragments
//! - `compiler/` - QueryIntent + AccessDecision → CompileResult
//! - `chart` - CompileResult → ChartHints
//!
//! # Example
//!
//! ```ignore
//! use intentql::{parser, AccessDecision, CallerContext, QueryCompiler};
//!
//! let policy = parser::parse_policy_file("policy.yaml")?;
//! let compiler = QueryCompiler::new(parser::parse_config_file("config.yaml")?)?;
//! let intent = parser::parse_intent_response(&interpreter_output)?;
//! let caller = CallerContext::new("u-42").with_role("analyst");
//! let result = compiler.compile(&intent, &AccessDecision::new(&policy, &caller));
//! if let Some(sql) = result.executable_sql() {
//!     // bind the caller's tenant id to $1 and execute
//! }
//! ```

pub mod intent;
pub mod policy;
pub mod config;
pub mod ident;
pub mod parser;
pub mod predicate;
pub mod compiler;
pub mod chart;
pub mod error;

// Re-export commonly used types
pub use intent::{QueryIntent, Metric, Dimension, TimeFilter, Filter, OrderSpec, Aggregate, Granularity, TimeFilterKind, FilterOperator, SortDirection, ChartType, extract_json};
pub use policy::{AccessPolicy, AccessDecision, CallerContext, StaticPolicy, TablePolicy, RowFilter};
pub use config::{CompilerConfig, ROW_LIMIT_CEILING, TENANT_PARAM};
pub use compiler::{compile, QueryCompiler, CompileResult, CompileError, OutputColumn, ColumnKind, FilterCategory};
pub use chart::ChartHints;
pub use error::ParseError;
