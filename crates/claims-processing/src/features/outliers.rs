//! Z-score outlier removal.

use crate::config::ZScoreTail;
use crate::error::{ClaimsError, Result};
use crate::types::{ActionType, PreprocessingAction, ProcessingSummary};
use crate::utils::{f64_values, mean, std_dev};
use polars::prelude::*;
use tracing::{debug, warn};

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Remove rows whose z-score on `col_name` is not below `threshold`.
    ///
    /// Mean and sample standard deviation (ddof = 1) are taken over the
    /// non-null values of the frame as passed in. Rows with a null value are
    /// removed. Fails with `DegenerateStatistics` when the standard deviation
    /// is undefined or zero. Returns the number of rows removed.
    pub fn remove_zscore_outliers(
        df: &mut DataFrame,
        col_name: &str,
        threshold: f64,
        tail: ZScoreTail,
        summary: &mut ProcessingSummary,
    ) -> Result<usize> {
        let values = f64_values(df, col_name)?;

        let degenerate = |reason: &str| ClaimsError::DegenerateStatistics {
            column: col_name.to_string(),
            reason: reason.to_string(),
        };
        let mean = mean(&values).ok_or_else(|| degenerate("no non-null values"))?;
        let std = std_dev(&values, 1).ok_or_else(|| degenerate("fewer than two non-null values"))?;
        if std == 0.0 || !std.is_finite() {
            return Err(degenerate("standard deviation is zero"));
        }

        let mask_values: Vec<bool> = values
            .iter()
            .map(|v| {
                v.is_some_and(|x| {
                    let z = (x - mean) / std;
                    match tail {
                        ZScoreTail::Upper => z < threshold,
                        ZScoreTail::Both => z.abs() < threshold,
                    }
                })
            })
            .collect();

        let original_rows = df.height();
        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        *df = df.filter(&mask)?;

        let rows_removed = original_rows - df.height();
        summary.add_action(
            PreprocessingAction::new(
                ActionType::OutlierHandled,
                col_name,
                format!("Removed {} rows with z-score >= {}", rows_removed, threshold),
            )
            .with_details(format!("mean: {:.4}, std: {:.4}, tail: {:?}", mean, std, tail)),
        );
        debug!(
            "Removed {} outlier rows on '{}' (mean={:.4}, std={:.4})",
            rows_removed, col_name, mean, std
        );

        if df.height() == 0 {
            warn!("Outlier filter on '{}' removed every row", col_name);
            summary.add_warning(format!("All rows removed by outlier filter on {}", col_name));
        }

        Ok(rows_removed)
    }
}
