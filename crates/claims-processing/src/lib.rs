//! Third-Party Claims Processing Library
//!
//! Cleaning and feature engineering for motor insurance claims with
//! third-party involvement, built with Rust and Polars.
//!
//! # Overview
//!
//! The library turns a raw claims extract into a model-ready feature table
//! in three stages:
//!
//! - **Cleaning** ([`clean_data`]): drops uninformative columns, replaces the
//!   loss date with `days_since_loss`, removes invalid rows, restricts
//!   categoricals to their allowed values and indexes rows by claim number
//! - **Feature Engineering** ([`pre_process_data`]): mode imputation, Incurred
//!   outlier removal, 0/1 flags, a night-time flag and third-party aggregates
//! - **Model Preprocessing** ([`create_preprocessing_pipeline`]): an unfit
//!   impute/scale/one-hot transform the caller fits on training data
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use claims_processing::{ClaimsConfig, ClaimsPipeline, create_preprocessing_pipeline};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("claims.csv".into()))?
//!     .finish()?;
//!
//! let result = ClaimsPipeline::builder()
//!     .config(ClaimsConfig::default())
//!     .build()?
//!     .process(df)?;
//!
//! let mut transform = create_preprocessing_pipeline(
//!     &["Incurred", "days_since_loss", "total_from_regions"],
//!     &["Location_of_incident", "Weather_conditions"],
//! )?;
//! let model_input = transform.fit_transform(&result.features)?;
//! ```
//!
//! The stages can also be called one at a time:
//!
//! ```rust,ignore
//! use claims_processing::{clean_data, pre_process_data, ClaimsConfig};
//!
//! let config = ClaimsConfig::default();
//! let cleaned = clean_data(df, &config, reference_time)?;
//! let features = pre_process_data(&cleaned, &config)?;
//! ```
//!
//! # Configuration
//!
//! Use [`ClaimsConfig`] to change category domains, column groups, the
//! outlier threshold and the night-time window:
//!
//! ```rust,ignore
//! use claims_processing::config::*;
//!
//! let config = ClaimsConfig::builder()
//!     .outlier_z_threshold(3.0)
//!     .outlier_tail(ZScoreTail::Both)
//!     .night_hours(21, 5)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod columns;
pub mod config;
pub mod error;
pub mod features;
pub mod imputers;
pub mod pipeline;
pub mod schema;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, clean_data, clean_data_now};
pub use columns::ColumnGroups;
pub use config::{
    CategoryDomain, ClaimsConfig, ClaimsConfigBuilder, ConfigValidationError, ZScoreTail,
};
pub use error::{ClaimsError, Result as ClaimsResult, ResultExt};
pub use features::{FeatureEngineer, OutlierHandler, pre_process_data};
pub use imputers::{FillValue, ImputeStrategy, SimpleImputer, StatisticalImputer};
pub use pipeline::{ClaimsPipeline, ClaimsPipelineBuilder};
pub use schema::{SemanticType, StageSchema};
pub use transform::{
    OneHotEncoder, PreprocessingPipeline, StandardScaler, Transformer,
    create_preprocessing_pipeline,
};
pub use types::{
    ActionType, IndexedFrame, PipelineResult, PreprocessingAction, ProcessingSummary,
};
