//! Predicate compiler (verb module)
//!
//! Pure functions turning time windows and user filters into SQL boolean
//! fragments. Column identifiers passed in must already be validated and
//! authorized; values are embedded only through `literal`.

mod filter;
mod literal;
mod time;

pub use filter::filter_predicate;
pub use literal::{date_literal, escape_string, like_pattern, parse_date, quote_string, sanitize_date, scalar_literal, LikeShape, SanitizedDate};
pub use time::{resolve_time_predicate, resolve_window, time_predicate, DateRange, MAX_COUNT, ResolvedWindow, TimeFilterNote, TimePredicate, TimeWindow};
