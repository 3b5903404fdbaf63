//! Time window predicates
//!
//! A loose `TimeFilter` is first validated into a `TimeWindow`, a closed sum
//! type that carries exactly the parameters its variant needs. Rendering a
//! `TimeWindow` is total: every variant yields a predicate, and "now" is
//! always the database's `CURRENT_DATE`, never a date guessed upstream.

use chrono::NaiveDate;
use std::fmt;

use crate::intent::{TimeFilter, TimeFilterKind};
use super::literal::{date_literal, sanitize_date};

/// A validated time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    ThisYearMonth { month: u32 },
    LastYearMonth { month: u32 },
    LastNDays(u32),
    LastNMonths(u32),
    ThisQuarter,
    Today,
    ThisWeek,
    Custom(DateRange),
}

/// Inclusive custom range with at least one bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    From(NaiveDate),
    To(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

/// Why a time filter was not taken at face value
/// Largest `n` for `last_n_*`; PostgreSQL interval fields are 32-bit signed
pub const MAX_COUNT: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFilterNote {
    /// `*_year_month` without a month in 1..=12; fell back to this month
    MissingMonth(TimeFilterKind),
    /// `last_n_*` without an `n` in 1..=`MAX_COUNT`; fell back to this month
    MissingCount(TimeFilterKind),
    /// `custom` without any bound; fell back to this month
    EmptyCustomRange,
    /// A `custom` bound failed to parse; the compilation date was used
    UnparsableDate { bound: &'static str, substitute: NaiveDate },
}

impl fmt::Display for TimeFilterNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFilterNote::MissingMonth(kind) => {
                write!(f, "time filter '{}' requires a month between 1 and 12; using this_month instead", kind)
            }
            TimeFilterNote::MissingCount(kind) => {
                write!(
                    f,
                    "time filter '{}' requires n between 1 and {}; using this_month instead",
                    kind, MAX_COUNT
                )
            }
            TimeFilterNote::EmptyCustomRange => {
                write!(f, "custom time filter has neither dateFrom nor dateTo; using this_month instead")
            }
            TimeFilterNote::UnparsableDate { bound, substitute } => {
                write!(f, "custom time filter {} is not a valid date; using {} instead", bound, substitute.format("%Y-%m-%d"))
            }
        }
    }
}

/// A validated window plus every fallback applied to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub window: TimeWindow,
    pub notes: Vec<TimeFilterNote>,
}

impl ResolvedWindow {
    fn exact(window: TimeWindow) -> Self {
        Self { window, notes: Vec::new() }
    }

    fn fallback(note: TimeFilterNote) -> Self {
        Self {
            window: TimeWindow::ThisMonth,
            notes: vec![note],
        }
    }
}

/// Validate a loose time filter.
///
/// Malformed requests resolve to `ThisMonth` (or substitute `today` for an
/// unparsable custom bound) and record a note. This favors availability over
/// strictness; every fallback is reported so it can be surfaced to the user.
pub fn resolve_window(filter: &TimeFilter, today: NaiveDate) -> ResolvedWindow {
    let month = filter
        .month
        .and_then(|m| u32::try_from(m).ok())
        .filter(|m| (1..=12).contains(m));
    let count = filter
        .n
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| (1..=MAX_COUNT).contains(n));

    match filter.kind {
        TimeFilterKind::ThisMonth => ResolvedWindow::exact(TimeWindow::ThisMonth),
        TimeFilterKind::LastMonth => ResolvedWindow::exact(TimeWindow::LastMonth),
        TimeFilterKind::ThisYear => ResolvedWindow::exact(TimeWindow::ThisYear),
        TimeFilterKind::LastYear => ResolvedWindow::exact(TimeWindow::LastYear),
        TimeFilterKind::ThisYearMonth => match month {
            Some(month) => ResolvedWindow::exact(TimeWindow::ThisYearMonth { month }),
            None => ResolvedWindow::fallback(TimeFilterNote::MissingMonth(filter.kind)),
        },
        TimeFilterKind::LastYearMonth => match month {
            Some(month) => ResolvedWindow::exact(TimeWindow::LastYearMonth { month }),
            None => ResolvedWindow::fallback(TimeFilterNote::MissingMonth(filter.kind)),
        },
        TimeFilterKind::LastNDays => match count {
            Some(n) => ResolvedWindow::exact(TimeWindow::LastNDays(n)),
            None => ResolvedWindow::fallback(TimeFilterNote::MissingCount(filter.kind)),
        },
        TimeFilterKind::LastNMonths => match count {
            Some(n) => ResolvedWindow::exact(TimeWindow::LastNMonths(n)),
            None => ResolvedWindow::fallback(TimeFilterNote::MissingCount(filter.kind)),
        },
        TimeFilterKind::ThisQuarter => ResolvedWindow::exact(TimeWindow::ThisQuarter),
        TimeFilterKind::Today => ResolvedWindow::exact(TimeWindow::Today),
        TimeFilterKind::ThisWeek => ResolvedWindow::exact(TimeWindow::ThisWeek),
        TimeFilterKind::Custom => resolve_custom(filter, today),
    }
}

fn resolve_custom(filter: &TimeFilter, today: NaiveDate) -> ResolvedWindow {
    let mut notes = Vec::new();
    let mut bound = |raw: Option<&String>, name: &'static str| -> Option<NaiveDate> {
        raw.map(|raw| {
            let sanitized = sanitize_date(raw, today);
            if sanitized.substituted {
                notes.push(TimeFilterNote::UnparsableDate { bound: name, substitute: today });
            }
            sanitized.date
        })
    };
    let from = bound(filter.date_from.as_ref(), "dateFrom");
    let to = bound(filter.date_to.as_ref(), "dateTo");

    let range = match (from, to) {
        (Some(from), Some(to)) => DateRange::Between(from, to),
        (Some(from), None) => DateRange::From(from),
        (None, Some(to)) => DateRange::To(to),
        (None, None) => return ResolvedWindow::fallback(TimeFilterNote::EmptyCustomRange),
    };
    ResolvedWindow {
        window: TimeWindow::Custom(range),
        notes,
    }
}

/// Render a window over an already-validated, authorized date column.
pub fn time_predicate(window: &TimeWindow, field: &str) -> String {
    match window {
        TimeWindow::ThisMonth => {
            format!("DATE_TRUNC('month', {field}) = DATE_TRUNC('month', CURRENT_DATE)")
        }
        TimeWindow::LastMonth => format!(
            "DATE_TRUNC('month', {field}) = DATE_TRUNC('month', CURRENT_DATE - INTERVAL '1 month')"
        ),
        TimeWindow::ThisYear => {
            format!("EXTRACT(YEAR FROM {field}) = EXTRACT(YEAR FROM CURRENT_DATE)")
        }
        TimeWindow::LastYear => {
            format!("EXTRACT(YEAR FROM {field}) = EXTRACT(YEAR FROM CURRENT_DATE) - 1")
        }
        TimeWindow::ThisYearMonth { month } => format!(
            "EXTRACT(YEAR FROM {field}) = EXTRACT(YEAR FROM CURRENT_DATE) AND EXTRACT(MONTH FROM {field}) = {month}"
        ),
        TimeWindow::LastYearMonth { month } => format!(
            "EXTRACT(YEAR FROM {field}) = EXTRACT(YEAR FROM CURRENT_DATE) - 1 AND EXTRACT(MONTH FROM {field}) = {month}"
        ),
        TimeWindow::LastNDays(n) => {
            format!("{field} >= CURRENT_DATE - INTERVAL '{n} days'")
        }
        TimeWindow::LastNMonths(n) => {
            format!("{field} >= DATE_TRUNC('month', CURRENT_DATE - INTERVAL '{n} months')")
        }
        TimeWindow::ThisQuarter => {
            format!("DATE_TRUNC('quarter', {field}) = DATE_TRUNC('quarter', CURRENT_DATE)")
        }
        TimeWindow::Today => format!("{field} = CURRENT_DATE"),
        TimeWindow::ThisWeek => {
            format!("DATE_TRUNC('week', {field}) = DATE_TRUNC('week', CURRENT_DATE)")
        }
        TimeWindow::Custom(range) => match range {
            DateRange::From(from) => format!("{field} >= {}", date_literal(*from)),
            DateRange::To(to) => format!("{field} <= {}", date_literal(*to)),
            DateRange::Between(from, to) => format!(
                "{field} >= {} AND {field} <= {}",
                date_literal(*from),
                date_literal(*to)
            ),
        },
    }
}

/// A rendered time predicate and the fallbacks applied on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePredicate {
    pub sql: String,
    pub notes: Vec<TimeFilterNote>,
}

/// Validate and render in one step.
pub fn resolve_time_predicate(filter: &TimeFilter, field: &str, today: NaiveDate) -> TimePredicate {
    let resolved = resolve_window(filter, today);
    TimePredicate {
        sql: time_predicate(&resolved.window, field),
        notes: resolved.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    fn render(filter: TimeFilter) -> TimePredicate {
        resolve_time_predicate(&filter, "order_date", today())
    }

    fn kind(kind: TimeFilterKind) -> TimeFilter {
        TimeFilter::new(kind)
    }

    #[test]
    fn test_this_month_golden() {
        let p = render(kind(TimeFilterKind::ThisMonth));
        assert_eq!(p.sql, "DATE_TRUNC('month', order_date) = DATE_TRUNC('month', CURRENT_DATE)");
        assert!(p.notes.is_empty());
    }

    #[test]
    fn test_last_n_days_golden() {
        let p = render(TimeFilter { n: Some(30), ..kind(TimeFilterKind::LastNDays) });
        assert_eq!(p.sql, "order_date >= CURRENT_DATE - INTERVAL '30 days'");
    }

    #[test]
    fn test_last_n_months_truncates() {
        let p = render(TimeFilter { n: Some(3), ..kind(TimeFilterKind::LastNMonths) });
        assert_eq!(p.sql, "order_date >= DATE_TRUNC('month', CURRENT_DATE - INTERVAL '3 months')");
    }

    #[test]
    fn test_relative_windows() {
        assert_eq!(
            render(kind(TimeFilterKind::LastMonth)).sql,
            "DATE_TRUNC('month', order_date) = DATE_TRUNC('month', CURRENT_DATE - INTERVAL '1 month')"
        );
        assert_eq!(
            render(kind(TimeFilterKind::ThisYear)).sql,
            "EXTRACT(YEAR FROM order_date) = EXTRACT(YEAR FROM CURRENT_DATE)"
        );
        assert_eq!(
            render(kind(TimeFilterKind::LastYear)).sql,
            "EXTRACT(YEAR FROM order_date) = EXTRACT(YEAR FROM CURRENT_DATE) - 1"
        );
        assert_eq!(
            render(kind(TimeFilterKind::ThisQuarter)).sql,
            "DATE_TRUNC('quarter', order_date) = DATE_TRUNC('quarter', CURRENT_DATE)"
        );
        assert_eq!(render(kind(TimeFilterKind::Today)).sql, "order_date = CURRENT_DATE");
        assert_eq!(
            render(kind(TimeFilterKind::ThisWeek)).sql,
            "DATE_TRUNC('week', order_date) = DATE_TRUNC('week', CURRENT_DATE)"
        );
    }

    #[test]
    fn test_year_month_variants() {
        let p = render(TimeFilter { month: Some(11), ..kind(TimeFilterKind::ThisYearMonth) });
        assert_eq!(
            p.sql,
            "EXTRACT(YEAR FROM order_date) = EXTRACT(YEAR FROM CURRENT_DATE) AND EXTRACT(MONTH FROM order_date) = 11"
        );
        let p = render(TimeFilter { month: Some(2), ..kind(TimeFilterKind::LastYearMonth) });
        assert_eq!(
            p.sql,
            "EXTRACT(YEAR FROM order_date) = EXTRACT(YEAR FROM CURRENT_DATE) - 1 AND EXTRACT(MONTH FROM order_date) = 2"
        );
    }

    #[test]
    fn test_missing_month_falls_back_to_this_month() {
        let p = render(kind(TimeFilterKind::ThisYearMonth));
        assert_eq!(p.sql, "DATE_TRUNC('month', order_date) = DATE_TRUNC('month', CURRENT_DATE)");
        assert_eq!(p.notes, vec![TimeFilterNote::MissingMonth(TimeFilterKind::ThisYearMonth)]);

        let p = render(TimeFilter { month: Some(13), ..kind(TimeFilterKind::LastYearMonth) });
        assert_eq!(p.notes, vec![TimeFilterNote::MissingMonth(TimeFilterKind::LastYearMonth)]);
    }

    #[test]
    fn test_non_positive_count_falls_back() {
        let p = render(TimeFilter { n: Some(0), ..kind(TimeFilterKind::LastNDays) });
        assert_eq!(p.sql, "DATE_TRUNC('month', order_date) = DATE_TRUNC('month', CURRENT_DATE)");
        assert_eq!(p.notes, vec![TimeFilterNote::MissingCount(TimeFilterKind::LastNDays)]);

        let p = render(TimeFilter { n: Some(-5), ..kind(TimeFilterKind::LastNMonths) });
        assert_eq!(p.notes.len(), 1);
    }

    #[test]
    fn test_oversized_count_falls_back_with_range_note() {
        let p = render(TimeFilter { n: Some(1_000_000_000_000), ..kind(TimeFilterKind::LastNDays) });
        assert_eq!(p.sql, "DATE_TRUNC('month', order_date) = DATE_TRUNC('month', CURRENT_DATE)");
        assert_eq!(
            p.notes[0].to_string(),
            "time filter 'last_n_days' requires n between 1 and 2147483647; using this_month instead"
        );

        let p = render(TimeFilter { n: Some(i64::from(MAX_COUNT) + 1), ..kind(TimeFilterKind::LastNMonths) });
        assert_eq!(p.notes.len(), 1);

        let p = render(TimeFilter { n: Some(i64::from(MAX_COUNT)), ..kind(TimeFilterKind::LastNDays) });
        assert!(p.notes.is_empty());
    }

    #[test]
    fn test_custom_ranges() {
        let both = TimeFilter {
            date_from: Some("2024-01-01".into()),
            date_to: Some("2024-12-31".into()),
            ..kind(TimeFilterKind::Custom)
        };
        assert_eq!(
            render(both).sql,
            "order_date >= '2024-01-01'::date AND order_date <= '2024-12-31'::date"
        );

        let from = TimeFilter { date_from: Some("2024-01-01".into()), ..kind(TimeFilterKind::Custom) };
        assert_eq!(render(from).sql, "order_date >= '2024-01-01'::date");

        let to = TimeFilter { date_to: Some("2024-12-31".into()), ..kind(TimeFilterKind::Custom) };
        assert_eq!(render(to).sql, "order_date <= '2024-12-31'::date");
    }

    #[test]
    fn test_custom_unparsable_bound_uses_today() {
        let filter = TimeFilter {
            date_from: Some("2024-01-01'; DROP TABLE sales_orders;--".into()),
            ..kind(TimeFilterKind::Custom)
        };
        let p = render(filter);
        assert_eq!(p.sql, "order_date >= '2025-11-20'::date");
        assert_eq!(
            p.notes,
            vec![TimeFilterNote::UnparsableDate { bound: "dateFrom", substitute: today() }]
        );
    }

    #[test]
    fn test_custom_without_bounds_falls_back() {
        let p = render(kind(TimeFilterKind::Custom));
        assert_eq!(p.sql, "DATE_TRUNC('month', order_date) = DATE_TRUNC('month', CURRENT_DATE)");
        assert_eq!(p.notes, vec![TimeFilterNote::EmptyCustomRange]);
    }
}
