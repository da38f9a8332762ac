//! Reusable preprocessing transform for model inputs.
//!
//! [`create_preprocessing_pipeline`] returns an unfit [`PreprocessingPipeline`]
//! with two parallel branches:
//!
//! - numeric: mean imputation, then standardization
//! - categorical: most-frequent imputation, then one-hot encoding
//!
//! Fitting and applying are separate steps owned by the caller:
//!
//! ```rust,ignore
//! use claims_processing::transform::create_preprocessing_pipeline;
//!
//! let mut pipeline = create_preprocessing_pipeline(
//!     &["Incurred", "days_since_loss"],
//!     &["Weather_conditions"],
//! )?;
//! pipeline.fit(&train)?;
//! let model_input = pipeline.transform(&test)?;
//! ```

mod column;
mod encoder;
mod scaler;

pub use column::{Branch, ColumnTransformer, TransformChain};
pub use encoder::OneHotEncoder;
pub use scaler::StandardScaler;

use crate::error::{ClaimsError, Result};
use crate::imputers::{ImputeStrategy, SimpleImputer};
use crate::types::IndexedFrame;
use polars::prelude::*;
use tracing::info;

/// Branch name prefixed to numeric output columns (`num__<col>`).
pub const NUMERIC_BRANCH: &str = "num";
/// Branch name prefixed to one-hot output columns (`ohe__<col>_<category>`).
pub const CATEGORICAL_BRANCH: &str = "ohe";

/// A step with a fit/transform lifecycle.
///
/// `transform` must fail with [`ClaimsError::NotFitted`] until `fit` has
/// succeeded.
pub trait Transformer: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Learn parameters from `df`.
    fn fit(&mut self, df: &DataFrame) -> Result<()>;

    /// Apply learned parameters to `df`, returning only the output columns.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    fn is_fitted(&self) -> bool;

    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }
}

/// Numeric branch: mean imputation then standard scaling.
pub fn numeric_pipeline(columns: &[String]) -> TransformChain {
    TransformChain::new(vec![
        Box::new(SimpleImputer::new(ImputeStrategy::Mean, columns.to_vec())),
        Box::new(StandardScaler::new(columns.to_vec())),
    ])
}

/// Categorical branch: most-frequent imputation then one-hot encoding.
pub fn categorical_pipeline(columns: &[String]) -> TransformChain {
    TransformChain::new(vec![
        Box::new(SimpleImputer::new(ImputeStrategy::MostFrequent, columns.to_vec())),
        Box::new(OneHotEncoder::new(columns.to_vec())),
    ])
}

/// Build an unfit numeric + categorical preprocessing transform.
///
/// The column lists must be disjoint and not both empty. Columns in neither
/// list are dropped from the output; the index column is always kept.
pub fn create_preprocessing_pipeline<N, C>(num_cols: &[N], ohe_cols: &[C]) -> Result<PreprocessingPipeline>
where
    N: AsRef<str>,
    C: AsRef<str>,
{
    let num_cols: Vec<String> = num_cols.iter().map(|c| c.as_ref().to_string()).collect();
    let ohe_cols: Vec<String> = ohe_cols.iter().map(|c| c.as_ref().to_string()).collect();

    if num_cols.is_empty() && ohe_cols.is_empty() {
        return Err(ClaimsError::InvalidConfig(
            "preprocessing pipeline needs at least one column".to_string(),
        ));
    }

    if let Some(shared) = num_cols.iter().find(|c| ohe_cols.contains(c)) {
        return Err(ClaimsError::InvalidConfig(format!(
            "column '{}' is listed as both numeric and categorical",
            shared
        )));
    }

    let mut branches = Vec::new();
    if !num_cols.is_empty() {
        branches.push(Branch::new(NUMERIC_BRANCH, num_cols.clone(), numeric_pipeline(&num_cols)));
    }
    if !ohe_cols.is_empty() {
        branches.push(Branch::new(
            CATEGORICAL_BRANCH,
            ohe_cols.clone(),
            categorical_pipeline(&ohe_cols),
        ));
    }

    Ok(PreprocessingPipeline {
        transformer: ColumnTransformer::new(branches),
    })
}

/// Column transformer lifted to indexed frames.
///
/// Output rows keep the input's index column, so the result can be joined
/// back to the feature table by claim number.
pub struct PreprocessingPipeline {
    transformer: ColumnTransformer,
}

static_assertions::assert_impl_all!(PreprocessingPipeline: Send, Sync);

impl PreprocessingPipeline {
    pub fn fit(&mut self, data: &IndexedFrame) -> Result<()> {
        info!(
            "Fitting preprocessing pipeline on {} rows",
            data.height()
        );
        self.transformer.fit(data.frame())
    }

    pub fn transform(&self, data: &IndexedFrame) -> Result<IndexedFrame> {
        let transformed = self.transformer.transform(data.frame())?;

        let mut columns = Vec::with_capacity(transformed.width() + 1);
        columns.push(data.index()?.clone().into_column());
        columns.extend(transformed.get_columns().iter().cloned());

        let frame = DataFrame::new(columns)?;
        Ok(IndexedFrame::from_parts_unchecked(
            frame,
            data.index_name().into(),
        ))
    }

    pub fn fit_transform(&mut self, data: &IndexedFrame) -> Result<IndexedFrame> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn is_fitted(&self) -> bool {
        self.transformer.is_fitted()
    }

    /// Output column names (index excluded), available after fit.
    pub fn feature_names_out(&self) -> Option<&[String]> {
        self.transformer.feature_names_out()
    }
}
