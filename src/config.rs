//! Compiler configuration
//!
//! Operator-controlled settings, loaded from YAML. Nothing here can be
//! influenced by request input.

use serde::Deserialize;

use crate::error::ParseError;
use crate::ident::{is_canonical_identifier, is_canonical_table_name};

/// Absolute ceiling on returned rows. Not configurable.
pub const ROW_LIMIT_CEILING: u32 = 1000;

/// Placeholder bound to the caller's tenant id by the execution layer
pub const TENANT_PARAM: &str = "$1";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Column compared against the tenant bind parameter
    pub tenant_column: String,
    /// Date column used when a time filter names none
    pub default_date_field: String,
    /// Table used when an intent names none; `None` rejects such intents
    pub default_table: Option<String>,
    /// Row count used when the intent's limit is absent or unusable
    pub default_limit: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            tenant_column: "company_code".to_string(),
            default_date_field: "order_date".to_string(),
            default_table: None,
            default_limit: 100,
        }
    }
}

impl CompilerConfig {
    pub fn with_tenant_column(mut self, column: impl Into<String>) -> Self {
        self.tenant_column = column.into();
        self
    }

    pub fn with_default_date_field(mut self, field: impl Into<String>) -> Self {
        self.default_date_field = field.into();
        self
    }

    pub fn with_default_table(mut self, table: impl Into<String>) -> Self {
        self.default_table = Some(table.into());
        self
    }

    /// Every identifier here is emitted verbatim, so all must be valid and
    /// already in the lower-case form PostgreSQL folds to.
    pub fn validate(&self) -> Result<(), ParseError> {
        if !is_canonical_identifier(&self.tenant_column) {
            return Err(ParseError::InvalidConfig(format!(
                "tenantColumn '{}' is not a valid lower-case identifier",
                self.tenant_column
            )));
        }
        if !is_canonical_identifier(&self.default_date_field) {
            return Err(ParseError::InvalidConfig(format!(
                "defaultDateField '{}' is not a valid lower-case identifier",
                self.default_date_field
            )));
        }
        if let Some(table) = &self.default_table {
            if !is_canonical_table_name(table) {
                return Err(ParseError::InvalidConfig(format!(
                    "defaultTable '{}' is not a valid lower-case table name",
                    table
                )));
            }
        }
        if self.default_limit == 0 {
            return Err(ParseError::InvalidConfig("defaultLimit must be positive".to_string()));
        }
        Ok(())
    }

    /// The mandatory tenant isolation predicate
    pub fn tenant_predicate(&self) -> String {
        format!("{} = {}", self.tenant_column, TENANT_PARAM)
    }

    /// `min(requested, ceiling)`; absent or non-positive requests use the default
    pub fn effective_limit(&self, requested: Option<i64>) -> u32 {
        let requested = requested
            .filter(|n| *n > 0)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(self.default_limit);
        requested.min(ROW_LIMIT_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tenant_predicate(), "company_code = $1");
    }

    #[test]
    fn test_effective_limit() {
        let config = CompilerConfig::default();
        assert_eq!(config.effective_limit(Some(5000)), 1000);
        assert_eq!(config.effective_limit(Some(10)), 10);
        assert_eq!(config.effective_limit(Some(i64::MAX)), 1000);
        assert_eq!(config.effective_limit(None), 100);
        assert_eq!(config.effective_limit(Some(0)), 100);
        assert_eq!(config.effective_limit(Some(-3)), 100);
    }

    #[test]
    fn test_default_limit_is_clamped_too() {
        let config = CompilerConfig {
            default_limit: 50_000,
            ..Default::default()
        };
        assert_eq!(config.effective_limit(None), 1000);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: CompilerConfig = serde_yaml::from_str("tenantColumn: org_id\n").unwrap();
        assert_eq!(config.tenant_column, "org_id");
        assert_eq!(config.default_date_field, "order_date");
        assert_eq!(config.default_limit, 100);
    }

    #[test]
    fn test_validate_rejects_injection_in_identifiers() {
        let config = CompilerConfig::default().with_tenant_column("company_code = company_code OR 1");
        assert!(config.validate().is_err());

        let config = CompilerConfig::default().with_default_table("orders; DROP TABLE x");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_folded_names() {
        assert!(CompilerConfig::default().with_tenant_column("Company_Code").validate().is_err());
        assert!(CompilerConfig::default().with_default_table("Sales.Orders").validate().is_err());
        assert!(CompilerConfig::default().with_tenant_column("user").validate().is_err());
        assert!(CompilerConfig::default().with_default_table("sales.orders").validate().is_ok());
    }
}
