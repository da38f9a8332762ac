//! Shared utilities for the claims stages.
//!
//! Column access helpers that turn absent columns into
//! [`ClaimsError::ColumnNotFound`], plus small statistics used by more than
//! one stage.

use crate::error::{ClaimsError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType holds text-like categories.
#[inline]
pub fn is_string_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Fail with [`ClaimsError::ColumnNotFound`] on the first absent column.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<()> {
    for col in columns {
        let name = col.as_ref();
        if df.column(name).is_err() {
            return Err(ClaimsError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

/// Borrow a column as a Series, mapping absence to `ColumnNotFound`.
pub fn column_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| ClaimsError::ColumnNotFound(name.to_string()))
}

/// Drop columns, failing if any of them is absent.
pub fn drop_columns<S: AsRef<str>>(df: DataFrame, columns: &[S]) -> Result<DataFrame> {
    require_columns(&df, columns)?;
    let names: Vec<PlSmallStr> = columns.iter().map(|c| c.as_ref().into()).collect();
    Ok(df.drop_many(names))
}

/// Read a column as optional f64 values.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column_series(df, name)?;
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Read a column as optional owned strings.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column_series(df, name)?;
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-null value of a Series, compared as strings.
///
/// Ties resolve to the smallest value in lexical order, so the result does
/// not depend on row order.
pub fn string_mode(series: &Series) -> Option<String> {
    let str_series = series.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in value_counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

/// Mean of the non-null values, `None` if there are none.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Standard deviation of the non-null values with `ddof` delta degrees of freedom.
///
/// `None` when there are not more than `ddof` values.
pub fn std_dev(values: &[Option<f64>], ddof: usize) -> Option<f64> {
    let mean = mean(values)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() <= ddof {
        return None;
    }
    let sum_sq: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (present.len() - ddof) as f64).sqrt())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.cast(&DataType::String)?;
    let filled: Vec<String> = str_series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value).to_string())
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let filled: Vec<f64> = float_series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_is_datetime_dtype() {
        assert!(is_datetime_dtype(&DataType::Date));
        assert!(is_datetime_dtype(&DataType::Datetime(
            TimeUnit::Milliseconds,
            None
        )));
        assert!(!is_datetime_dtype(&DataType::String));
    }

    #[test]
    fn test_require_columns_reports_first_missing() {
        let df = df!["a" => [1, 2]].unwrap();
        assert!(require_columns(&df, &["a"]).is_ok());

        let err = require_columns(&df, &["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, ClaimsError::ColumnNotFound(ref c) if c == "b"));
    }

    #[test]
    fn test_drop_columns_missing_fails() {
        let df = df!["a" => [1], "b" => [2]].unwrap();
        let dropped = drop_columns(df.clone(), &["a"]).unwrap();
        assert_eq!(dropped.width(), 1);

        assert!(drop_columns(df, &["z"]).is_err());
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_tie_picks_smallest() {
        let series = Series::new("test".into(), &[Some("WET"), Some("NORMAL"), None]);
        assert_eq!(string_mode(&series), Some("NORMAL".to_string()));
    }

    #[test]
    fn test_string_mode_all_null() {
        let series = Series::new("test".into(), &[Option::<&str>::None, None]);
        assert_eq!(string_mode(&series), None);
    }

    #[test]
    fn test_mean_and_std() {
        let values = [Some(2.0), Some(4.0), None, Some(6.0)];
        assert_eq!(mean(&values), Some(4.0));
        assert_eq!(std_dev(&values, 1), Some(2.0));
        assert!((std_dev(&values, 0).unwrap() - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(std_dev(&[Some(1.0)], 1), None);
        assert_eq!(mean(&[None]), None);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("a"), None]);
        let filled = fill_string_nulls(&series, "z").unwrap();
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.str().unwrap().get(1), Some("z"));
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }
}
