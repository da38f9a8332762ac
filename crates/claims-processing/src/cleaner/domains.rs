//! Categorical domain enforcement.

use crate::config::CategoryDomain;
use crate::error::Result;
use polars::prelude::*;

/// Replace every value outside `domain` with null.
///
/// Returns the new series and how many non-null values were replaced.
pub(crate) fn restrict_to_domain(
    series: &Series,
    domain: &CategoryDomain,
) -> Result<(Series, usize)> {
    let str_series = series.cast(&DataType::String)?;
    let mut replaced = 0;

    let values: Vec<Option<&str>> = str_series
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(val) if domain.contains(val) => Some(val),
            Some(_) => {
                replaced += 1;
                None
            }
            None => None,
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), replaced))
}

/// Keep values equal to `keep`; everything else, nulls included, becomes `fallback`.
///
/// Returns the new series and how many values were rewritten.
pub(crate) fn default_unless(
    series: &Series,
    keep: &str,
    fallback: &str,
) -> Result<(Series, usize)> {
    let str_series = series.cast(&DataType::String)?;
    let mut replaced = 0;

    let values: Vec<&str> = str_series
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(val) if val == keep => keep,
            Some(val) if val == fallback => fallback,
            _ => {
                replaced += 1;
                fallback
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), replaced))
}
