//! Row-wise derived columns.

use crate::error::Result;
use crate::utils::{f64_values, string_values};
use polars::prelude::*;

/// 1 where the value is exactly `yes`, 0 otherwise (nulls included).
pub(crate) fn binarize(df: &DataFrame, col: &str, yes: &str) -> Result<Series> {
    let flags: Vec<i32> = string_values(df, col)?
        .into_iter()
        .map(|v| i32::from(v.as_deref() == Some(yes)))
        .collect();
    Ok(Series::new(col.into(), flags))
}

/// 1 where the hour falls in the inclusive window `start..=end`, else 0.
///
/// When `start > end` the window wraps past midnight, so `(20, 5)` covers
/// 20:00 to 05:59. A missing hour counts as day.
pub(crate) fn night_flag(
    df: &DataFrame,
    hour_col: &str,
    start: u32,
    end: u32,
    out_name: &str,
) -> Result<Series> {
    let (start, end) = (f64::from(start), f64::from(end));
    let in_window = |h: f64| {
        if start <= end {
            start <= h && h <= end
        } else {
            h >= start || h <= end
        }
    };

    let flags: Vec<i32> = f64_values(df, hour_col)?
        .into_iter()
        .map(|h| i32::from(h.is_some_and(in_window)))
        .collect();
    Ok(Series::new(out_name.into(), flags))
}

/// How [`row_sum`] treats a null cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NullPolicy {
    /// Count the cell as 0.
    Zero,
    /// The whole row sum becomes null.
    Propagate,
}

/// Row-wise Float64 sum of `cols`.
pub(crate) fn row_sum<S: AsRef<str>>(
    df: &DataFrame,
    cols: &[S],
    out_name: &str,
    nulls: NullPolicy,
) -> Result<Series> {
    let mut totals: Vec<Option<f64>> = vec![Some(0.0); df.height()];

    for col in cols {
        let values = f64_values(df, col.as_ref())?;
        for (total, value) in totals.iter_mut().zip(values) {
            *total = match (*total, value, nulls) {
                (Some(t), Some(v), _) => Some(t + v),
                (Some(t), None, NullPolicy::Zero) => Some(t),
                _ => None,
            };
        }
    }

    Ok(Series::new(out_name.into(), totals))
}
