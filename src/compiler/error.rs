//! Compiler errors
//!
//! Hard failures only. Messages say what was rejected, never echo
//! unvalidated request text.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The intent names no table, or a name that is not a plain identifier
    InvalidTable,
    /// The access policy refused the (validated) table
    AccessDenied { table: String },
    /// Every dimension and metric was dropped by validation or authorization
    NoAccessibleColumns,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidTable => {
                write!(f, "Intent does not name a valid table")
            }
            CompileError::AccessDenied { table } => {
                write!(f, "Access to table '{}' denied", table)
            }
            CompileError::NoAccessibleColumns => {
                write!(f, "No accessible columns")
            }
        }
    }
}

impl std::error::Error for CompileError {}
