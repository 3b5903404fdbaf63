//! Access policy declared in YAML
//!
//! ```yaml
//! tables:
//!   sales_orders:
//!     roles: [sales, admin]
//!     fields: [order_date, amount_total, partner_code, dept_code]
//!     restrictedFields:
//!       cost_total: [admin]
//!     rowFilters:
//!       - field: dept_code
//!         userAttribute: department
//!     exemptRoles: [admin]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::ident::{is_canonical_identifier, is_canonical_table_name};
use crate::predicate::quote_string;
use super::port::{AccessPolicy, CallerContext};

/// Allowlist policy loaded from configuration
#[derive(Debug, Default, Deserialize)]
pub struct StaticPolicy {
    #[serde(default)]
    pub tables: BTreeMap<String, TablePolicy>,
}

/// Access rules for one table
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePolicy {
    /// Roles that may query the table; empty means any caller
    #[serde(default)]
    pub roles: Vec<String>,
    /// Columns any admitted caller may reference
    #[serde(default)]
    pub fields: Vec<String>,
    /// Columns visible only to the listed roles
    #[serde(default)]
    pub restricted_fields: BTreeMap<String, Vec<String>>,
    /// Row-level security, ANDed together
    #[serde(default)]
    pub row_filters: Vec<RowFilter>,
    /// Roles that bypass `row_filters`
    #[serde(default)]
    pub exempt_roles: Vec<String>,
}

/// Restrict rows to those where `field` equals the caller's `user_attribute`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFilter {
    pub field: String,
    pub user_attribute: String,
}

impl StaticPolicy {
    /// Reject policies that would place invalid identifiers into SQL.
    ///
    /// Names are compared against the folded form the compiler produces, so
    /// a mixed-case entry could never match and is rejected as well.
    pub fn validate(&self) -> Result<(), ParseError> {
        for (name, table) in &self.tables {
            if !is_canonical_table_name(name) {
                return Err(ParseError::InvalidConfig(format!(
                    "policy table '{}' is not a valid lower-case table name",
                    name
                )));
            }
            let mut listed = table.fields.iter().chain(table.restricted_fields.keys());
            if let Some(field) = listed.find(|f| !is_canonical_identifier(f)) {
                return Err(ParseError::InvalidConfig(format!(
                    "field '{}' on table '{}' is not a valid lower-case identifier",
                    field, name
                )));
            }
            for filter in &table.row_filters {
                if !is_canonical_identifier(&filter.field) {
                    return Err(ParseError::InvalidConfig(format!(
                        "row filter column '{}' on table '{}' is not a valid lower-case identifier",
                        filter.field, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TablePolicy> {
        self.tables.get(name)
    }

    fn admitted(&self, table: &str, caller: &CallerContext) -> Option<&TablePolicy> {
        self.table(table).filter(|t| t.admits(caller))
    }
}

impl TablePolicy {
    fn admits(&self, caller: &CallerContext) -> bool {
        self.roles.is_empty() || caller.has_any_role(&self.roles)
    }

    fn field_visible(&self, field: &str, caller: &CallerContext) -> bool {
        match self.restricted_fields.get(field) {
            Some(roles) => caller.has_any_role(roles),
            None => self.fields.iter().any(|f| f == field),
        }
    }

    fn row_predicate(&self, caller: &CallerContext) -> Option<String> {
        if self.row_filters.is_empty() || caller.has_any_role(&self.exempt_roles) {
            return None;
        }
        let parts: Vec<String> = self
            .row_filters
            .iter()
            .map(|rf| match caller.attribute(&rf.user_attribute) {
                Some(value) => format!("{} = {}", rf.field, quote_string(value)),
                // Fail closed: a caller without the claim sees no rows
                None => "FALSE".to_string(),
            })
            .collect();
        Some(parts.join(" AND "))
    }
}

impl AccessPolicy for StaticPolicy {
    fn table_allowed(&self, table: &str, caller: &CallerContext) -> bool {
        self.admitted(table, caller).is_some()
    }

    fn field_allowed(&self, table: &str, field: &str, caller: &CallerContext) -> bool {
        self.admitted(table, caller)
            .map(|t| t.field_visible(field, caller))
            .unwrap_or(false)
    }

    fn row_level_predicate(&self, table: &str, caller: &CallerContext) -> Option<String> {
        self.admitted(table, caller).and_then(|t| t.row_predicate(caller))
    }
}
