//! Query compilation
//!
//! Drives one intent through validation, authorization and clause
//! rendering. Recoverable problems become warnings on a successful result;
//! anything else fails the whole compilation with no SQL.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::CompilerConfig;
use crate::error::ParseError;
use crate::ident::{canonical, is_identifier, is_reserved_word, is_table_name, MAX_IDENTIFIER_LEN};
use crate::intent::{OrderSpec, QueryIntent, SortDirection, TimeFilter};
use crate::policy::AccessDecision;
use crate::predicate::{filter_predicate, resolve_time_predicate};

use super::clauses::{
    from_clause, group_by_clause, limit_clause, order_by_clause, select_clause, where_clause,
    OrderKey, SelectItem, SqlClauses,
};
use super::error::CompileError;
use super::result::{CompileResult, FilterCategory};

/// Compiles query intents into tenant-scoped, parameterized SQL.
///
/// Holds only operator configuration; every call is independent, so one
/// compiler can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    config: CompilerConfig,
}

/// Compile with the default configuration.
pub fn compile(intent: &QueryIntent, access: &AccessDecision<'_>) -> CompileResult {
    QueryCompiler::default().compile(intent, access)
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig) -> Result<Self, ParseError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, intent: &QueryIntent, access: &AccessDecision<'_>) -> CompileResult {
        self.compile_on(intent, access, chrono::Local::now().date_naive())
    }

    /// Compile with an explicit current date for `custom` date substitution.
    pub fn compile_on(
        &self,
        intent: &QueryIntent,
        access: &AccessDecision<'_>,
        today: NaiveDate,
    ) -> CompileResult {
        let mut run = Compilation::new(&self.config, access, today);
        match run.build(intent) {
            Ok(compiled) => {
                info!(
                    user = %access.caller().user_id,
                    table = %compiled.table,
                    columns = compiled.columns.len(),
                    applied_filters = run.applied.len(),
                    warnings = run.warnings.len(),
                    "query intent compiled"
                );
                let columns = compiled.columns.iter().map(SelectItem::output_column).collect();
                CompileResult::success(compiled.sql, run.warnings, run.applied, columns)
            }
            Err(err) => {
                warn!(user = %access.caller().user_id, error = %err, "query intent rejected");
                CompileResult::failure(&err, run.warnings)
            }
        }
    }
}

struct Compiled {
    table: String,
    columns: Vec<SelectItem>,
    sql: String,
}

/// State of a single compilation
struct Compilation<'c, 'a> {
    config: &'c CompilerConfig,
    access: &'c AccessDecision<'a>,
    today: NaiveDate,
    warnings: Vec<String>,
    applied: Vec<String>,
    /// Output names already taken in the SELECT list
    aliases: BTreeSet<String>,
}

impl<'c, 'a> Compilation<'c, 'a> {
    fn new(config: &'c CompilerConfig, access: &'c AccessDecision<'a>, today: NaiveDate) -> Self {
        Self {
            config,
            access,
            today,
            warnings: Vec::new(),
            applied: Vec::new(),
            aliases: BTreeSet::new(),
        }
    }

    fn build(&mut self, intent: &QueryIntent) -> Result<Compiled, CompileError> {
        let table = self.resolve_table(intent)?;
        debug!(
            user = %self.access.caller().user_id,
            table = %table,
            dimensions = intent.dimensions.len(),
            metrics = intent.metrics.len(),
            filters = intent.filters.len(),
            "compiling query intent"
        );
        if !self.access.table_allowed(&table) {
            return Err(CompileError::AccessDenied { table });
        }

        let columns = self.select_items(intent, &table);
        if columns.is_empty() {
            return Err(CompileError::NoAccessibleColumns);
        }

        let predicates = self.predicates(intent, &table);
        let order_keys = self.order_keys(&intent.order_by, &columns, &table);

        let clauses = SqlClauses {
            select: select_clause(&columns),
            from: from_clause(&table),
            filter: where_clause(&predicates),
            group_by: group_by_clause(&columns),
            order_by: order_by_clause(&order_keys),
            limit: limit_clause(self.config.effective_limit(intent.limit)),
        };

        Ok(Compiled {
            sql: clauses.to_sql(),
            table,
            columns,
        })
    }

    /// Record a warning. `field` is only logged once it is a valid
    /// identifier.
    fn warn(&mut self, table: &str, field: Option<&str>, reason: &'static str, message: String) {
        match field {
            Some(field) => {
                warn!(table = %table, field = %field, reason, warning = %message, "query intent adjusted")
            }
            None => warn!(table = %table, reason, warning = %message, "query intent adjusted"),
        }
        self.warnings.push(message);
    }

    /// The table in folded form. Ill-formed names are never echoed.
    fn resolve_table(&self, intent: &QueryIntent) -> Result<String, CompileError> {
        let requested = intent.table.trim();
        let table = if requested.is_empty() {
            self.config
                .default_table
                .as_deref()
                .ok_or(CompileError::InvalidTable)?
        } else {
            requested
        };
        if !is_table_name(table) {
            return Err(CompileError::InvalidTable);
        }
        Ok(canonical(table))
    }

    /// Identifier check, case folding, then allowlist check. The policy only
    /// ever sees the folded name, which is also the name emitted.
    fn authorize_field(&mut self, role: &str, table: &str, field: &str) -> Option<String> {
        if !is_identifier(field) {
            self.warn(
                table,
                None,
                "invalid_identifier",
                format!("{} field is not a valid identifier; dropped", role),
            );
            return None;
        }
        let field = canonical(field);
        if !self.access.field_allowed(table, &field) {
            let message = format!("{} field '{}' is not accessible; dropped", role, field);
            self.warn(table, Some(&field), "not_accessible", message);
            return None;
        }
        Some(field)
    }

    /// A valid requested alias in folded form, else the default; then made
    /// unique among the columns emitted so far.
    fn resolve_alias(&mut self, table: &str, field: &str, requested: Option<&str>, default: String) -> String {
        let preferred = match requested {
            Some(alias) if is_identifier(alias) => canonical(alias),
            Some(alias) if is_reserved_word(alias) => {
                let message = format!("alias '{}' is a reserved word; using '{}'", canonical(alias), default);
                self.warn(table, Some(field), "reserved_alias", message);
                default.clone()
            }
            Some(_) => {
                let message = format!("alias is not a valid identifier; using '{}'", default);
                self.warn(table, Some(field), "invalid_alias", message);
                default.clone()
            }
            None => default.clone(),
        };

        let taken = self.aliases.contains(&preferred);
        let alias = if taken || !is_identifier(&preferred) {
            self.unused_alias(&default)
        } else {
            preferred.clone()
        };
        if taken {
            let message = format!("alias '{}' is already in use; using '{}'", preferred, alias);
            self.warn(table, Some(field), "duplicate_alias", message);
        }
        self.aliases.insert(alias.clone());
        alias
    }

    /// `base`, else `base_2`, `base_3`, ... trimmed to the identifier length
    fn unused_alias(&self, base: &str) -> String {
        let base = &base[..base.len().min(MAX_IDENTIFIER_LEN)];
        if !self.aliases.contains(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let suffix = format!("_{}", n);
            let stem = &base[..base.len().min(MAX_IDENTIFIER_LEN - suffix.len())];
            let candidate = format!("{}{}", stem, suffix);
            if !self.aliases.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Dimensions first, then metrics, in request order.
    fn select_items(&mut self, intent: &QueryIntent, table: &str) -> Vec<SelectItem> {
        let mut items = Vec::new();

        for dimension in &intent.dimensions {
            let Some(field) = self.authorize_field("dimension", table, &dimension.field) else {
                continue;
            };
            let alias = self.resolve_alias(table, &field, dimension.alias.as_deref(), dimension.default_alias());
            items.push(SelectItem::Dimension {
                field,
                granularity: dimension.granularity,
                alias,
            });
        }

        for metric in &intent.metrics {
            let Some(field) = self.authorize_field("metric", table, &metric.field) else {
                continue;
            };
            let alias = self.resolve_alias(table, &field, metric.alias.as_deref(), metric.default_alias());
            items.push(SelectItem::Metric {
                field,
                aggregate: metric.aggregate,
                alias,
            });
        }

        items
    }

    /// Tenant, row-level policy, time window, then user filters. Each
    /// embedded predicate is recorded in the audit trail.
    fn predicates(&mut self, intent: &QueryIntent, table: &str) -> Vec<String> {
        let mut predicates = Vec::new();

        let tenant = self.config.tenant_predicate();
        self.apply(&mut predicates, FilterCategory::Tenant, tenant);

        if let Some(policy) = self.access.row_level_predicate(table) {
            let policy = policy.trim();
            if !policy.is_empty() {
                self.apply(&mut predicates, FilterCategory::Policy, format!("({})", policy));
            }
        }

        if let Some(time_filter) = &intent.time_filter {
            if let Some(predicate) = self.time_predicate(time_filter, table) {
                self.apply(&mut predicates, FilterCategory::Time, predicate);
            }
        }

        for filter in &intent.filters {
            let Some(field) = self.authorize_field("filter", table, &filter.field) else {
                continue;
            };
            match filter_predicate(&field, filter.operator, filter.value.as_ref()) {
                Some(predicate) => self.apply(&mut predicates, FilterCategory::User, predicate),
                None if filter.value.is_none() && filter.operator.requires_value() => {
                    let message = format!(
                        "filter on '{}' dropped: operator '{}' requires a value",
                        field, filter.operator
                    );
                    self.warn(table, Some(&field), "missing_value", message);
                }
                None => {
                    let message = format!(
                        "filter on '{}' dropped: operator '{}' has no usable value",
                        field, filter.operator
                    );
                    self.warn(table, Some(&field), "unusable_value", message);
                }
            }
        }

        predicates
    }

    fn apply(&mut self, predicates: &mut Vec<String>, category: FilterCategory, predicate: String) {
        self.applied.push(category.tag(&predicate));
        predicates.push(predicate);
    }

    fn time_predicate(&mut self, time_filter: &TimeFilter, table: &str) -> Option<String> {
        let date_field = time_filter
            .date_field
            .clone()
            .unwrap_or_else(|| self.config.default_date_field.clone());
        let Some(field) = self.authorize_field("time filter date", table, &date_field) else {
            self.warn(table, None, "time_filter_dropped", "time filter dropped".to_string());
            return None;
        };

        let resolved = resolve_time_predicate(time_filter, &field, self.today);
        for note in &resolved.notes {
            self.warn(table, Some(&field), "time_fallback", note.to_string());
        }
        Some(resolved.sql)
    }

    /// Entries resolve against emitted columns only: an alias, or the field
    /// behind a column, maps to that column's alias. Matching is on the
    /// folded name.
    fn order_keys(&mut self, order_by: &[OrderSpec], columns: &[SelectItem], table: &str) -> Vec<OrderKey> {
        let mut keys = Vec::new();

        for entry in order_by {
            if !is_identifier(&entry.field) {
                self.warn(
                    table,
                    None,
                    "invalid_order",
                    "order by entry is not a valid identifier; dropped".to_string(),
                );
                continue;
            }
            let name = canonical(&entry.field);
            let target = columns
                .iter()
                .find(|c| c.alias() == name)
                .or_else(|| columns.iter().find(|c| c.field() == name));
            match target {
                Some(column) => keys.push(OrderKey::new(column.alias(), entry.direction)),
                None => {
                    let message = format!("order by '{}' does not match an output column; dropped", name);
                    self.warn(table, Some(&name), "unmatched_order", message);
                }
            }
        }

        let has_dimension = columns.iter().any(|c| matches!(c, SelectItem::Dimension { .. }));
        if keys.is_empty() && has_dimension {
            keys.push(OrderKey::new("1", SortDirection::Asc));
        }
        keys
    }
}
