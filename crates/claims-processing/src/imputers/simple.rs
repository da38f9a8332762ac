use crate::error::{ClaimsError, Result};
use crate::transform::Transformer;
use crate::utils::{column_series, f64_values, fill_numeric_nulls, fill_string_nulls, mean, string_mode};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a [`SimpleImputer`] picks its fill value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Mean of the non-null values; output is Float64.
    Mean,
    /// Mode of the non-null values compared as strings; output is String.
    MostFrequent,
}

/// A learned fill value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// Column-wise imputer with a separate fit step.
///
/// Fill values are learned once in [`Transformer::fit`] and reused on every
/// later [`Transformer::transform`], so a frame seen only at apply time is
/// filled with statistics from the training frame.
#[derive(Debug, Clone)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    columns: Vec<String>,
    fill_values: Option<Vec<FillValue>>,
}

impl SimpleImputer {
    pub fn new(strategy: ImputeStrategy, columns: Vec<String>) -> Self {
        Self {
            strategy,
            columns,
            fill_values: None,
        }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    /// Learned fill values, one per column, once fitted.
    pub fn fill_values(&self) -> Option<&[FillValue]> {
        self.fill_values.as_deref()
    }
}

impl Transformer for SimpleImputer {
    fn name(&self) -> &str {
        match self.strategy {
            ImputeStrategy::Mean => "mean_imputer",
            ImputeStrategy::MostFrequent => "most_frequent_imputer",
        }
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut fill_values = Vec::with_capacity(self.columns.len());

        for col in &self.columns {
            let fill = match self.strategy {
                ImputeStrategy::Mean => {
                    let values = f64_values(df, col)?;
                    FillValue::Number(
                        mean(&values).ok_or_else(|| ClaimsError::NoValidValues(col.clone()))?,
                    )
                }
                ImputeStrategy::MostFrequent => {
                    let series = column_series(df, col)?;
                    FillValue::Text(
                        string_mode(series).ok_or_else(|| ClaimsError::NoValidValues(col.clone()))?,
                    )
                }
            };
            debug!("{}: '{}' -> {:?}", self.name(), col, fill);
            fill_values.push(fill);
        }

        self.fill_values = Some(fill_values);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let fill_values = self
            .fill_values
            .as_ref()
            .ok_or_else(|| ClaimsError::NotFitted(self.name().to_string()))?;

        let mut columns = Vec::with_capacity(self.columns.len());
        for (col, fill) in self.columns.iter().zip(fill_values) {
            let series = column_series(df, col)?;
            let filled = match fill {
                FillValue::Number(v) => fill_numeric_nulls(series, *v)?,
                FillValue::Text(v) => fill_string_nulls(series, v)?,
            };
            columns.push(filled.into_column());
        }

        Ok(DataFrame::new(columns)?)
    }

    fn is_fitted(&self) -> bool {
        self.fill_values.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_imputer_fit_transform() {
        let train = df![
            "age" => [Some(20.0), None, Some(40.0)],
        ]
        .unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean, vec!["age".to_string()]);

        let out = imputer.fit_transform(&train).unwrap();
        let age = out.column("age").unwrap().f64().unwrap();
        assert_eq!(age.get(1), Some(30.0));
        assert_eq!(imputer.fill_values(), Some(&[FillValue::Number(30.0)][..]));
    }

    #[test]
    fn test_fill_values_come_from_fit_frame() {
        let train = df!["age" => [10.0, 20.0]].unwrap();
        let apply = df!["age" => [Some(100.0), None]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean, vec!["age".to_string()]);

        imputer.fit(&train).unwrap();
        let out = imputer.transform(&apply).unwrap();
        assert_eq!(out.column("age").unwrap().f64().unwrap().get(1), Some(15.0));
    }

    #[test]
    fn test_most_frequent_imputer() {
        let train = df![
            "weather" => [Some("WET"), Some("WET"), None, Some("NORMAL")],
        ]
        .unwrap();
        let mut imputer =
            SimpleImputer::new(ImputeStrategy::MostFrequent, vec!["weather".to_string()]);

        let out = imputer.fit_transform(&train).unwrap();
        assert_eq!(out.column("weather").unwrap().str().unwrap().get(2), Some("WET"));
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!["age" => [1.0]].unwrap();
        let imputer = SimpleImputer::new(ImputeStrategy::Mean, vec!["age".to_string()]);

        assert!(!imputer.is_fitted());
        let err = imputer.transform(&df).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FITTED");
    }

    #[test]
    fn test_fit_all_null_column() {
        let df = df!["age" => [Option::<f64>::None, None]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean, vec!["age".to_string()]);

        let err = imputer.fit(&df).unwrap_err();
        assert!(matches!(err, ClaimsError::NoValidValues(ref c) if c == "age"));
    }
}
