use serde::Deserialize;
use serde_json::Value;

use crate::ident::canonical;

use super::lenient;
use super::types::{Aggregate, ChartType, FilterOperator, Granularity, SortDirection, TimeFilterKind};

/// A structured query intent produced by the natural-language interpreter.
///
/// Every field is read defensively (see `lenient`). Nothing here is trusted:
/// `table` is not used to build SQL until the access policy admits it, and
/// every field name is validated and authorized before it reaches SQL text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
    /// Free-form label, informational only
    #[serde(default = "default_query_type", deserialize_with = "lenient::string")]
    pub query_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub table: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub metrics: Vec<Metric>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub dimensions: Vec<Dimension>,
    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub time_filter: Option<TimeFilter>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub filters: Vec<Filter>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub order_by: Vec<OrderSpec>,
    /// Requested row count; the compiler clamps it
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub limit: Option<i64>,
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub chart_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub explanation: Option<String>,
}

fn default_query_type() -> String {
    "sales_summary".to_string()
}

impl Default for QueryIntent {
    fn default() -> Self {
        Self {
            query_type: default_query_type(),
            table: String::new(),
            metrics: Vec::new(),
            dimensions: Vec::new(),
            time_filter: None,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            chart_type: ChartType::default(),
            chart_title: None,
            explanation: None,
        }
    }
}

/// An aggregated measure column
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metric {
    #[serde(default, deserialize_with = "lenient::string")]
    pub field: String,
    /// Unknown aggregates fall back to `sum`
    #[serde(default)]
    pub aggregate: Aggregate,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub alias: Option<String>,
}

impl Metric {
    pub fn new(field: impl Into<String>, aggregate: Aggregate) -> Self {
        Self {
            field: field.into(),
            aggregate,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// `"{aggregate}_{field}"` in folded case, used when no alias is given
    pub fn default_alias(&self) -> String {
        format!("{}_{}", self.aggregate, canonical(&self.field))
    }
}

/// A grouping column, optionally truncated to a date granularity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dimension {
    #[serde(default, deserialize_with = "lenient::string")]
    pub field: String,
    /// Unknown granularities fall back to `day`
    #[serde(default, deserialize_with = "lenient::opt_vocabulary")]
    pub granularity: Option<Granularity>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub alias: Option<String>,
}

impl Dimension {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            granularity: None,
            alias: None,
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn default_alias(&self) -> String {
        canonical(&self.field)
    }
}

/// Time window request. Only `kind` and the numeric/date parameters below
/// influence the generated predicate; the current date always comes from the
/// database (`CURRENT_DATE`) or the compiler, never from the interpreter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFilter {
    #[serde(rename = "type", default)]
    pub kind: TimeFilterKind,
    /// 1-12, required by the `*_year_month` kinds
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub month: Option<i64>,
    /// Required by the `last_n_*` kinds
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub n: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date_from: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date_to: Option<String>,
    /// Defaults to the compiler's configured date column
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date_field: Option<String>,
}

impl TimeFilter {
    pub fn new(kind: TimeFilterKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = Some(field.into());
        self
    }
}

/// A user-supplied predicate over one column
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filter {
    #[serde(default, deserialize_with = "lenient::string")]
    pub field: String,
    #[serde(default)]
    pub operator: FilterOperator,
    /// Scalar or array; `null` reads as absent
    #[serde(default, deserialize_with = "lenient::opt_value")]
    pub value: Option<Value>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Sort key; `field` names an output alias or a dimension field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSpec {
    #[serde(default, deserialize_with = "lenient::string")]
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}
