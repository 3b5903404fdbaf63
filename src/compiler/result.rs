//! Compilation output contract

use serde::Serialize;
use std::fmt;

use super::error::CompileError;

/// Outcome of one compilation.
///
/// Either `success` with SQL and an audit trail, or a failure with an error
/// and no SQL. A result with `success == false` must never be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One entry per dropped or adjusted element of the intent
    pub warnings: Vec<String>,
    /// Every predicate embedded in the WHERE clause, in order, tagged by category
    pub applied_filters: Vec<String>,
    /// Output columns in SELECT order
    pub columns: Vec<OutputColumn>,
}

impl CompileResult {
    pub(crate) fn success(
        sql: String,
        warnings: Vec<String>,
        applied_filters: Vec<String>,
        columns: Vec<OutputColumn>,
    ) -> Self {
        Self {
            success: true,
            sql: Some(sql),
            error: None,
            warnings,
            applied_filters,
            columns,
        }
    }

    pub(crate) fn failure(err: &CompileError, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            sql: None,
            error: Some(err.to_string()),
            warnings,
            applied_filters: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// The SQL to execute, only when compilation succeeded
    pub fn executable_sql(&self) -> Option<&str> {
        if self.success {
            self.sql.as_deref()
        } else {
            None
        }
    }

    /// Aliases of emitted dimension columns
    pub fn dimension_aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases_of(ColumnKind::Dimension)
    }

    /// Aliases of emitted metric columns
    pub fn metric_aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases_of(ColumnKind::Metric)
    }

    fn aliases_of(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.alias.as_str())
    }
}

/// One column of the result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputColumn {
    pub alias: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Dimension,
    Metric,
}

/// Origin of a WHERE predicate, recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCategory {
    Tenant,
    Policy,
    Time,
    User,
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCategory::Tenant => f.write_str("tenant"),
            FilterCategory::Policy => f.write_str("policy"),
            FilterCategory::Time => f.write_str("time"),
            FilterCategory::User => f.write_str("user"),
        }
    }
}

impl FilterCategory {
    /// Audit trail entry: `[category] predicate`
    pub fn tag(&self, predicate: &str) -> String {
        format!("[{}] {}", self, predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_no_sql() {
        let result = CompileResult::failure(&CompileError::NoAccessibleColumns, vec!["w".into()]);
        assert!(!result.success);
        assert_eq!(result.sql, None);
        assert_eq!(result.executable_sql(), None);
        assert_eq!(result.error.as_deref(), Some("No accessible columns"));
        assert_eq!(result.warnings, vec!["w".to_string()]);
    }

    #[test]
    fn test_serialized_shape() {
        let result = CompileResult::success(
            "SELECT 1".into(),
            vec![],
            vec![FilterCategory::Tenant.tag("company_code = $1")],
            vec![OutputColumn { alias: "total".into(), kind: ColumnKind::Metric }],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["sql"], "SELECT 1");
        assert!(json.get("error").is_none());
        assert_eq!(json["appliedFilters"][0], "[tenant] company_code = $1");
        assert_eq!(json["columns"][0]["kind"], "metric");
    }
}
