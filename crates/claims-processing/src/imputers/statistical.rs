//! Statistical imputation applied directly to a dataset snapshot.

use crate::error::{ClaimsError, Result};
use crate::types::{ActionType, PreprocessingAction, ProcessingSummary};
use crate::utils::{column_series, fill_string_nulls, string_mode};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill nulls in a categorical column with its most frequent value.
    ///
    /// The mode is computed over the frame as passed in. Ties go to the
    /// lexically smallest value. Fails if the column has no non-null values.
    /// Returns the fill value.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        summary: &mut ProcessingSummary,
    ) -> Result<String> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();

        let mode_val = string_mode(series).ok_or_else(|| ClaimsError::DegenerateStatistics {
            column: col_name.to_string(),
            reason: "no non-null values to take a mode from".to_string(),
        })?;

        let filled = fill_string_nulls(series, &mode_val)?;
        df.replace(col_name, filled)?;

        summary.add_action(
            PreprocessingAction::new(
                ActionType::ValueImputed,
                col_name,
                format!("Filled {} missing values with mode", missing),
            )
            .with_details(format!("mode: '{}'", mode_val)),
        );
        debug!("Filled '{}' with mode: '{}' ({} values)", col_name, mode_val, missing);

        Ok(mode_val)
    }
}
