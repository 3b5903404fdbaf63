//! Closed vocabularies used by query intents
//!
//! Each vocabulary parses strictly through `FromStr`, but deserializes
//! leniently: an unknown value resolves to the vocabulary's documented
//! default instead of failing the whole intent. See `super::lenient`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::lenient;

/// Error when a vocabulary string is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub vocabulary: &'static str,
    pub input: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} '{}'", self.vocabulary, self.input)
    }
}

impl std::error::Error for UnknownVariant {}

fn unknown(vocabulary: &'static str, input: &str) -> UnknownVariant {
    UnknownVariant {
        vocabulary,
        input: input.to_string(),
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Aggregation applied to a metric column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aggregate {
    #[default]
    Sum,
    Count,
    CountDistinct,
    Avg,
    Max,
    Min,
}

impl Aggregate {
    /// Render the aggregate call over an already-validated column identifier.
    pub fn apply(&self, field: &str) -> String {
        match self {
            Aggregate::Sum => format!("SUM({})", field),
            Aggregate::Count => format!("COUNT({})", field),
            Aggregate::CountDistinct => format!("COUNT(DISTINCT {})", field),
            Aggregate::Avg => format!("AVG({})", field),
            Aggregate::Max => format!("MAX({})", field),
            Aggregate::Min => format!("MIN({})", field),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregate::Sum => "sum",
            Aggregate::Count => "count",
            Aggregate::CountDistinct => "count_distinct",
            Aggregate::Avg => "avg",
            Aggregate::Max => "max",
            Aggregate::Min => "min",
        };
        f.write_str(name)
    }
}

impl FromStr for Aggregate {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(Aggregate::Sum),
            "count" => Ok(Aggregate::Count),
            "count_distinct" | "countdistinct" | "distinct_count" => Ok(Aggregate::CountDistinct),
            "avg" | "average" => Ok(Aggregate::Avg),
            "max" | "maximum" => Ok(Aggregate::Max),
            "min" | "minimum" => Ok(Aggregate::Min),
            _ => Err(unknown("aggregate", s)),
        }
    }
}

// ============================================================================
// Granularity
// ============================================================================

/// Truncation unit for date dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// Unit keyword understood by `DATE_TRUNC`
    pub fn unit(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unit())
    }
}

impl FromStr for Granularity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            "quarter" | "quarterly" => Ok(Granularity::Quarter),
            "year" | "yearly" => Ok(Granularity::Year),
            _ => Err(unknown("granularity", s)),
        }
    }
}

// ============================================================================
// TimeFilterKind
// ============================================================================

/// Relative or absolute time window requested by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeFilterKind {
    #[default]
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    ThisYearMonth,
    LastYearMonth,
    LastNDays,
    LastNMonths,
    ThisQuarter,
    Today,
    ThisWeek,
    Custom,
}

impl fmt::Display for TimeFilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFilterKind::ThisMonth => "this_month",
            TimeFilterKind::LastMonth => "last_month",
            TimeFilterKind::ThisYear => "this_year",
            TimeFilterKind::LastYear => "last_year",
            TimeFilterKind::ThisYearMonth => "this_year_month",
            TimeFilterKind::LastYearMonth => "last_year_month",
            TimeFilterKind::LastNDays => "last_n_days",
            TimeFilterKind::LastNMonths => "last_n_months",
            TimeFilterKind::ThisQuarter => "this_quarter",
            TimeFilterKind::Today => "today",
            TimeFilterKind::ThisWeek => "this_week",
            TimeFilterKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeFilterKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "this_month" => Ok(TimeFilterKind::ThisMonth),
            "last_month" => Ok(TimeFilterKind::LastMonth),
            "this_year" => Ok(TimeFilterKind::ThisYear),
            "last_year" => Ok(TimeFilterKind::LastYear),
            "this_year_month" => Ok(TimeFilterKind::ThisYearMonth),
            "last_year_month" => Ok(TimeFilterKind::LastYearMonth),
            "last_n_days" => Ok(TimeFilterKind::LastNDays),
            "last_n_months" => Ok(TimeFilterKind::LastNMonths),
            "this_quarter" => Ok(TimeFilterKind::ThisQuarter),
            "today" => Ok(TimeFilterKind::Today),
            "this_week" => Ok(TimeFilterKind::ThisWeek),
            "custom" => Ok(TimeFilterKind::Custom),
            _ => Err(unknown("time filter type", s)),
        }
    }
}

// ============================================================================
// FilterOperator
// ============================================================================

/// Comparison applied by a user filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterOperator {
    #[default]
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    /// Whether the operator needs a `value` to produce a predicate
    pub fn requires_value(&self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterOperator {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eq" | "=" => Ok(FilterOperator::Eq),
            "neq" | "ne" | "!=" | "<>" => Ok(FilterOperator::Neq),
            "gt" | ">" => Ok(FilterOperator::Gt),
            "gte" | ">=" => Ok(FilterOperator::Gte),
            "lt" | "<" => Ok(FilterOperator::Lt),
            "lte" | "<=" => Ok(FilterOperator::Lte),
            "like" | "contains" => Ok(FilterOperator::Like),
            "starts_with" => Ok(FilterOperator::StartsWith),
            "ends_with" => Ok(FilterOperator::EndsWith),
            "in" => Ok(FilterOperator::In),
            "not_in" => Ok(FilterOperator::NotIn),
            "is_null" => Ok(FilterOperator::IsNull),
            "is_not_null" => Ok(FilterOperator::IsNotNull),
            _ => Err(unknown("filter operator", s)),
        }
    }
}

// ============================================================================
// SortDirection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(unknown("sort direction", s)),
        }
    }
}

// ============================================================================
// ChartType
// ============================================================================

/// Presentation hint passed through to the chart layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartType {
    Line,
    #[default]
    Bar,
    Pie,
    Table,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Table => "table",
        };
        f.write_str(name)
    }
}

impl FromStr for ChartType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "table" => Ok(ChartType::Table),
            _ => Err(unknown("chart type", s)),
        }
    }
}

// ============================================================================
// Serde: lenient in, canonical name out
// ============================================================================

impl<'de> Deserialize<'de> for Aggregate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::vocabulary(deserializer)
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::vocabulary(deserializer)
    }
}

impl<'de> Deserialize<'de> for TimeFilterKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::vocabulary(deserializer)
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::vocabulary(deserializer)
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::vocabulary(deserializer)
    }
}

impl<'de> Deserialize<'de> for ChartType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::vocabulary(deserializer)
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

impl Serialize for Aggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_display(self, serializer)
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_display(self, serializer)
    }
}

impl Serialize for TimeFilterKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_display(self, serializer)
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_display(self, serializer)
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_display(self, serializer)
    }
}

impl Serialize for ChartType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_display(self, serializer)
    }
}
