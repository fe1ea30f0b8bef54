use core_types::{AlignedRow, NamedSeries};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;

/// Decimal places aligned values are rounded to unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 2;

/// Merges several date-keyed series onto one shared, ascending date axis.
///
/// Every date present in any series gets exactly one row. Each row holds one
/// cell per input series, in input order: the rounded value if that series
/// has the date, `None` otherwise. Dates are compared as strings, which is
/// chronological for ISO-8601 keys. Series names are assumed unique.
pub fn align(series: &[NamedSeries], precision: u32) -> Vec<AlignedRow> {
    let dates: BTreeSet<&str> = series
        .iter()
        .flat_map(|s| s.points.keys().map(String::as_str))
        .collect();

    dates
        .into_iter()
        .map(|date| AlignedRow {
            date: date.to_string(),
            values: series
                .iter()
                .map(|s| {
                    let value = s.points.get(date).map(|v| round_to(*v, precision));
                    (s.name.clone(), value)
                })
                .collect(),
        })
        .collect()
}

/// Rounds half away from zero on the exact binary value, then goes back
/// through the decimal string so the result is the nearest `f64`.
/// Values outside the decimal range are passed through unchanged.
fn round_to(value: f64, precision: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_string().parse().ok())
        .unwrap_or(value)
}
