//! Main claims pipeline module.
//!
//! This module provides the `ClaimsPipeline` struct and builder for running
//! cleaning and feature engineering as one step.

use crate::cleaner::DataCleaner;
use crate::config::{ClaimsConfig, ConfigValidationError};
use crate::features::FeatureEngineer;
use crate::types::{PipelineResult, ProcessingSummary};
use crate::error::Result;
use chrono::{Local, NaiveDateTime};
use polars::prelude::*;
use std::time::Instant;
use tracing::{error, info};

/// Cleaning followed by feature engineering.
///
/// Use [`ClaimsPipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use claims_processing::{ClaimsConfig, ClaimsPipeline};
///
/// let result = ClaimsPipeline::builder()
///     .config(ClaimsConfig::builder().outlier_z_threshold(3.0).build()?)
///     .reference_time(reference)
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} feature rows", result.features.height());
/// ```
#[derive(Debug, Clone)]
pub struct ClaimsPipeline {
    config: ClaimsConfig,
    reference_time: Option<NaiveDateTime>,
}

static_assertions::assert_impl_all!(ClaimsPipeline: Send, Sync);

impl ClaimsPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> ClaimsPipelineBuilder {
        ClaimsPipelineBuilder::default()
    }

    pub fn config(&self) -> &ClaimsConfig {
        &self.config
    }

    /// Process a raw claims extract into the feature table.
    ///
    /// Without a fixed reference time the local clock is read once per call.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        self.process_internal(df).inspect_err(|e| {
            error!("Pipeline error: {}", e);
        })
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let reference_time = self
            .reference_time
            .unwrap_or_else(|| Local::now().naive_local());

        info!("Starting claims pipeline (reference time {})...", reference_time);

        let mut summary = ProcessingSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        info!("Step 1: Cleaning raw claims...");
        let cleaned = DataCleaner::new(&self.config).clean(df, reference_time, &mut summary)?;

        info!("Step 2: Engineering features...");
        let features = FeatureEngineer::new(&self.config).engineer(&cleaned, &mut summary)?;

        summary.rows_after = features.height();
        summary.columns_after = features.width();
        summary.rows_removed = summary.rows_before.saturating_sub(summary.rows_after);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Pipeline complete in {}ms: {} -> {} rows ({:.1}% removed), {} actions",
            summary.duration_ms,
            summary.rows_before,
            summary.rows_after,
            summary.rows_removed_percentage(),
            summary.actions.len()
        );

        Ok(PipelineResult { features, summary })
    }
}

/// Builder for creating a [`ClaimsPipeline`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = ClaimsPipeline::builder()
///     .config(ClaimsConfig::default())
///     .reference_time(NaiveDate::from_ymd_opt(2024, 1, 31)?.and_hms_opt(0, 0, 0)?)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ClaimsPipelineBuilder {
    config: Option<ClaimsConfig>,
    reference_time: Option<NaiveDateTime>,
}

impl ClaimsPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: ClaimsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Fix the time `days_since_loss` is measured from.
    ///
    /// Runs with the same reference time and input give the same output.
    pub fn reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<ClaimsPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(ClaimsPipeline {
            config,
            reference_time: self.reference_time,
        })
    }
}
