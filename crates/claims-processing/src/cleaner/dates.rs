//! Loss-date parsing and recency derivation.

use crate::error::{ClaimsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use polars::prelude::*;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days from each loss date to `reference`, floored.
///
/// A loss half a day after `reference` yields -1, matching a floor on the
/// fractional day count. Null dates stay null; any other value that no format
/// in `formats` can parse is an error.
pub(crate) fn days_since(
    series: &Series,
    reference: NaiveDateTime,
    formats: &[String],
    out_name: &str,
) -> Result<Series> {
    let dates = to_datetimes(series, formats)?;
    let days: Vec<Option<i64>> = dates
        .into_iter()
        .map(|d| d.map(|loss| whole_days_between(loss, reference)))
        .collect();

    Ok(Series::new(out_name.into(), days))
}

fn whole_days_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

fn to_datetimes(series: &Series, formats: &[String]) -> Result<Vec<Option<NaiveDateTime>>> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.naive_utc();

    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|d| {
                    d.map(|d| {
                        TimeDelta::try_days(i64::from(d))
                            .and_then(|delta| epoch.checked_add_signed(delta))
                            .ok_or_else(|| out_of_range(series, d))
                    })
                    .transpose()
                })
                .collect()
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .map(|v| {
                    v.map(|v| {
                        let delta = match unit {
                            TimeUnit::Nanoseconds => Some(TimeDelta::nanoseconds(v)),
                            TimeUnit::Microseconds => Some(TimeDelta::microseconds(v)),
                            TimeUnit::Milliseconds => TimeDelta::try_milliseconds(v),
                        };
                        delta
                            .and_then(|delta| epoch.checked_add_signed(delta))
                            .ok_or_else(|| out_of_range(series, v))
                    })
                    .transpose()
                })
                .collect()
        }
        DataType::String | DataType::Null => {
            let text = series.cast(&DataType::String)?;
            text.str()?
                .into_iter()
                .map(|v| match v {
                    None => Ok(None),
                    Some(raw) => parse_datetime(raw, formats)
                        .map(Some)
                        .ok_or_else(|| ClaimsError::DateParse {
                            column: series.name().to_string(),
                            value: raw.to_string(),
                        }),
                })
                .collect()
        }
        other => Err(ClaimsError::SchemaMismatch {
            column: series.name().to_string(),
            expected: "date, datetime or string".to_string(),
            found: other.to_string(),
        }),
    }
}

fn out_of_range(series: &Series, raw: impl ToString) -> ClaimsError {
    ClaimsError::DateParse {
        column: series.name().to_string(),
        value: raw.to_string(),
    }
}

/// Parse with the first matching format; date-only formats map to midnight.
pub fn parse_datetime(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    formats.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(trimmed, fmt).ok().or_else(|| {
            NaiveDate::parse_from_str(trimmed, fmt)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
    })
}
