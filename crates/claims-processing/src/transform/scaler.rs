use super::Transformer;
use crate::error::{ClaimsError, Result};
use crate::utils::{f64_values, mean, std_dev};
use polars::prelude::*;
use tracing::debug;

/// Per-column shift and scale learned at fit.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaleParams {
    mean: f64,
    scale: f64,
}

/// Standardizes columns to zero mean and unit variance.
///
/// Uses the population standard deviation. A constant column gets scale 1,
/// so it maps to all zeros instead of NaN. Nulls pass through as nulls.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    columns: Vec<String>,
    params: Option<Vec<ScaleParams>>,
}

impl StandardScaler {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            params: None,
        }
    }

    /// Learned `(mean, scale)` for `column`, once fitted.
    pub fn params_for(&self, column: &str) -> Option<(f64, f64)> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.params
            .as_ref()
            .map(|params| (params[idx].mean, params[idx].scale))
    }
}

impl Transformer for StandardScaler {
    fn name(&self) -> &str {
        "standard_scaler"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut params = Vec::with_capacity(self.columns.len());

        for col in &self.columns {
            let values = f64_values(df, col)?;
            let mean = mean(&values).ok_or_else(|| ClaimsError::NoValidValues(col.clone()))?;
            let scale = match std_dev(&values, 0) {
                Some(std) if std > 0.0 && std.is_finite() => std,
                _ => 1.0,
            };
            debug!("standard_scaler: '{}' mean={} scale={}", col, mean, scale);
            params.push(ScaleParams { mean, scale });
        }

        self.params = Some(params);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| ClaimsError::NotFitted(self.name().to_string()))?;

        let mut columns = Vec::with_capacity(self.columns.len());
        for (col, p) in self.columns.iter().zip(params) {
            let scaled: Vec<Option<f64>> = f64_values(df, col)?
                .into_iter()
                .map(|v| v.map(|x| (x - p.mean) / p.scale))
                .collect();
            columns.push(Series::new(col.as_str().into(), scaled).into_column());
        }

        Ok(DataFrame::new(columns)?)
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }
}
