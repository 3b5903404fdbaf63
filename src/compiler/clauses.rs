//! Clause builders
//!
//! Each clause is rendered by its own pure function from already-validated
//! parts, then joined in fixed order by `SqlClauses::to_sql`. Nothing in
//! this file validates: every identifier reaching it has passed `ident` and
//! the access policy, every predicate has been rendered by `predicate`.

use crate::intent::{Aggregate, Granularity, SortDirection};

use super::result::{ColumnKind, OutputColumn};

/// One validated SELECT column
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectItem {
    Dimension {
        field: String,
        granularity: Option<Granularity>,
        alias: String,
    },
    Metric {
        field: String,
        aggregate: Aggregate,
        alias: String,
    },
}

impl SelectItem {
    pub fn alias(&self) -> &str {
        match self {
            SelectItem::Dimension { alias, .. } | SelectItem::Metric { alias, .. } => alias,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            SelectItem::Dimension { field, .. } | SelectItem::Metric { field, .. } => field,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            SelectItem::Dimension { .. } => ColumnKind::Dimension,
            SelectItem::Metric { .. } => ColumnKind::Metric,
        }
    }

    pub fn output_column(&self) -> OutputColumn {
        OutputColumn {
            alias: self.alias().to_string(),
            kind: self.kind(),
        }
    }

    fn render(&self) -> String {
        match self {
            SelectItem::Dimension { field, granularity: Some(g), alias } => {
                format!("DATE_TRUNC('{}', {}) AS {}", g.unit(), field, alias)
            }
            SelectItem::Dimension { field, granularity: None, alias } => {
                if field == alias {
                    field.clone()
                } else {
                    format!("{} AS {}", field, alias)
                }
            }
            SelectItem::Metric { field, aggregate, alias } => {
                format!("{} AS {}", aggregate.apply(field), alias)
            }
        }
    }
}

/// One resolved ORDER BY key; `expr` is an emitted alias or a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderKey {
    pub expr: String,
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn new(expr: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            expr: expr.into(),
            direction,
        }
    }
}

pub(crate) fn select_clause(items: &[SelectItem]) -> String {
    let columns: Vec<String> = items.iter().map(SelectItem::render).collect();
    format!("SELECT {}", columns.join(", "))
}

pub(crate) fn from_clause(table: &str) -> String {
    format!("FROM {}", table)
}

/// Predicates are ANDed in the order given; the tenant predicate must be first.
pub(crate) fn where_clause(predicates: &[String]) -> String {
    format!("WHERE {}", predicates.join(" AND "))
}

/// Truncated dimensions group by 1-based SELECT position, plain ones by field.
pub(crate) fn group_by_clause(items: &[SelectItem]) -> Option<String> {
    let keys: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            SelectItem::Dimension { granularity: Some(_), .. } => Some((i + 1).to_string()),
            SelectItem::Dimension { field, granularity: None, .. } => Some(field.clone()),
            SelectItem::Metric { .. } => None,
        })
        .collect();

    if keys.is_empty() {
        None
    } else {
        Some(format!("GROUP BY {}", keys.join(", ")))
    }
}

pub(crate) fn order_by_clause(keys: &[OrderKey]) -> Option<String> {
    if keys.is_empty() {
        return None;
    }
    let keys: Vec<String> = keys
        .iter()
        .map(|k| format!("{} {}", k.expr, k.direction.keyword()))
        .collect();
    Some(format!("ORDER BY {}", keys.join(", ")))
}

pub(crate) fn limit_clause(limit: u32) -> String {
    format!("LIMIT {}", limit)
}

/// Rendered clauses of one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SqlClauses {
    pub select: String,
    pub from: String,
    pub filter: String,
    pub group_by: Option<String>,
    pub order_by: Option<String>,
    pub limit: String,
}

impl SqlClauses {
    /// SELECT, FROM, WHERE, GROUP BY, ORDER BY, LIMIT; single-space joined
    pub fn to_sql(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.select, &self.from, &self.filter];
        if let Some(group_by) = &self.group_by {
            parts.push(group_by);
        }
        if let Some(order_by) = &self.order_by {
            parts.push(order_by);
        }
        parts.push(&self.limit);
        parts.join(" ")
    }
}
