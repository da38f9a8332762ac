//! Imputation module for handling missing values.
//!
//! - [`StatisticalImputer`]: one-shot, in-place fills used by feature engineering
//! - [`SimpleImputer`]: fit/transform imputer used by the preprocessing pipeline

mod simple;
mod statistical;

pub use simple::{FillValue, ImputeStrategy, SimpleImputer};
pub use statistical::StatisticalImputer;
