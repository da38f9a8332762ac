//! Structural cleaning of raw claim extracts.
//!
//! This module provides:
//! - Dropping columns with no predictive signal
//! - Replacing the loss date with a `days_since_loss` recency feature
//! - Removing rows with negative notification periods or incurred amounts
//! - Restricting categorical columns to their allowed values
//! - Promoting the claim number to the index

mod dates;
mod domains;

use crate::columns::*;
use crate::config::ClaimsConfig;
use crate::error::{Result, ResultExt};
use crate::schema::StageSchema;
use crate::types::{ActionType, IndexedFrame, PreprocessingAction, ProcessingSummary};
use crate::utils::{column_series, drop_columns, f64_values};
use chrono::{Local, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, info, warn};

pub use dates::parse_datetime;

/// Columns removed before anything else: free text, codes, and a capped copy of `Incurred`.
const IRRELEVANT_COLUMNS: [&str; 3] = [LOSS_CODE, LOSS_DESCRIPTION, CAPPED_INCURRED];

/// Present on nearly every claim, so it carries no signal.
const UNINFORMATIVE_COLUMNS: [&str; 1] = [VEHICLE_REGISTRATION_PRESENT];

/// Clean a raw claims extract.
///
/// `reference_time` is the "now" that `days_since_loss` is measured from.
/// Fails on the first missing column, unparseable loss date, or duplicate
/// claim number. Applying it to its own output fails because the raw-only
/// columns are gone.
pub fn clean_data(
    data: DataFrame,
    config: &ClaimsConfig,
    reference_time: NaiveDateTime,
) -> Result<IndexedFrame> {
    let mut summary = ProcessingSummary::new();
    DataCleaner::new(config).clean(data, reference_time, &mut summary)
}

/// [`clean_data`] measured from the local wall clock.
///
/// Results change from day to day; use [`clean_data`] where runs must be
/// reproducible.
pub fn clean_data_now(data: DataFrame, config: &ClaimsConfig) -> Result<IndexedFrame> {
    clean_data(data, config, Local::now().naive_local())
}

/// Data cleaner for raw claim extracts.
pub struct DataCleaner<'a> {
    config: &'a ClaimsConfig,
}

impl<'a> DataCleaner<'a> {
    pub fn new(config: &'a ClaimsConfig) -> Self {
        Self { config }
    }

    /// Run every cleaning step in order, recording actions in `summary`.
    pub fn clean(
        &self,
        df: DataFrame,
        reference_time: NaiveDateTime,
        summary: &mut ProcessingSummary,
    ) -> Result<IndexedFrame> {
        info!("Cleaning {} claim rows...", df.height());

        StageSchema::raw_claims(self.config)
            .check(&df)
            .context("clean_data input")?;

        // 1. Drop irrelevant columns
        let df = self.drop_with_action(df, &IRRELEVANT_COLUMNS, "No predictive signal", summary)?;

        // 2. Loss date -> days since loss
        let df = self.derive_days_since_loss(df, reference_time, summary)?;

        // 3. Remove rows with negative notification period or incurred amount
        let df = self.remove_invalid_rows(df, summary)?;

        // 4. Drop near-constant column
        let df = self.drop_with_action(df, &UNINFORMATIVE_COLUMNS, "Near-constant", summary)?;

        // 5. Restrict categorical domains
        let df = self.normalize_categories(df, summary)?;

        // 6. Claim number -> index
        let indexed = IndexedFrame::set_index(df, CLAIM_NUMBER)?;
        summary.add_action(PreprocessingAction::new(
            ActionType::IndexSet,
            CLAIM_NUMBER,
            "Promoted claim number to index",
        ));

        info!(
            "Cleaning complete: {} rows, {} columns",
            indexed.height(),
            indexed.width()
        );
        Ok(indexed)
    }

    fn drop_with_action(
        &self,
        df: DataFrame,
        columns: &[&str],
        reason: &str,
        summary: &mut ProcessingSummary,
    ) -> Result<DataFrame> {
        let df = drop_columns(df, columns)?;
        for col in columns {
            summary.add_action(PreprocessingAction::new(
                ActionType::ColumnRemoved,
                *col,
                reason,
            ));
        }
        debug!("Dropped {:?}: {}", columns, reason);
        Ok(df)
    }

    fn derive_days_since_loss(
        &self,
        mut df: DataFrame,
        reference_time: NaiveDateTime,
        summary: &mut ProcessingSummary,
    ) -> Result<DataFrame> {
        let dates = column_series(&df, DATE_OF_LOSS)?;
        let days = dates::days_since(
            dates,
            reference_time,
            &self.config.date_formats,
            DAYS_SINCE_LOSS,
        )?;

        let missing = days.null_count();
        df.with_column(days)?;

        summary.add_action(
            PreprocessingAction::new(
                ActionType::ColumnDerived,
                DAYS_SINCE_LOSS,
                format!("Derived from {} relative to {}", DATE_OF_LOSS, reference_time),
            )
            .with_details(format!("{} missing loss dates", missing)),
        );
        let df = self.drop_with_action(
            df,
            &[DATE_OF_LOSS],
            &format!("Replaced by {}", DAYS_SINCE_LOSS),
            summary,
        )?;
        debug!(
            "Derived {} relative to {} ({} missing dates)",
            DAYS_SINCE_LOSS, reference_time, missing
        );
        Ok(df)
    }

    fn remove_invalid_rows(
        &self,
        df: DataFrame,
        summary: &mut ProcessingSummary,
    ) -> Result<DataFrame> {
        let mut df = df;

        // Nulls fail the comparison and are removed with the negatives.
        for col in [NOTIFICATION_PERIOD, INCURRED] {
            let before = df.height();
            let mask_values: Vec<bool> = f64_values(&df, col)?
                .into_iter()
                .map(|v| v.is_some_and(|v| v >= 0.0))
                .collect();

            let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
            df = df.filter(&mask)?;

            let removed = before - df.height();
            if removed > 0 {
                summary.add_action(PreprocessingAction::new(
                    ActionType::RowsRemoved,
                    col,
                    format!("Removed {} rows with negative or missing {}", removed, col),
                ));
                debug!("Removed {} rows with negative {}", removed, col);
            }
        }

        if df.height() == 0 {
            warn!("No claim rows left after removing invalid rows");
            summary.add_warning("All rows removed by validity filters");
        }

        Ok(df)
    }

    fn normalize_categories(
        &self,
        mut df: DataFrame,
        summary: &mut ProcessingSummary,
    ) -> Result<DataFrame> {
        for domain in &self.config.domains {
            let series = column_series(&df, &domain.column)?;
            let (restricted, replaced) = domains::restrict_to_domain(series, domain)?;
            df.replace(&domain.column, restricted)?;

            if replaced > 0 {
                summary.add_action(
                    PreprocessingAction::new(
                        ActionType::ValueCleaned,
                        domain.column.as_str(),
                        format!("Replaced {} out-of-domain values with null", replaced),
                    )
                    .with_details(format!("allowed: {:?}", domain.allowed)),
                );
            }
            debug!("Restricted '{}': {} values nulled", domain.column, replaced);
        }

        let main_driver = column_series(&df, MAIN_DRIVER)?;
        let (defaulted, replaced) = domains::default_unless(
            main_driver,
            &self.config.yes_value,
            &self.config.no_value,
        )?;
        df.replace(MAIN_DRIVER, defaulted)?;

        if replaced > 0 {
            summary.add_action(PreprocessingAction::new(
                ActionType::ValueCleaned,
                MAIN_DRIVER,
                format!(
                    "Set {} values to '{}'",
                    replaced, self.config.no_value
                ),
            ));
        }
        debug!("Defaulted {} '{}' values", replaced, MAIN_DRIVER);

        Ok(df)
    }
}
