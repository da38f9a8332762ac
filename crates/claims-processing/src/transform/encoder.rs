use super::Transformer;
use crate::error::{ClaimsError, Result};
use crate::utils::string_values;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// One-hot encodes categorical columns.
///
/// Categories are learned at fit and kept in sorted order: numerically when
/// every category parses as a number, lexically otherwise. Each input column
/// `c` with categories `k1..kn` becomes Float64 indicator columns `c_k1..c_kn`.
/// A value not seen at fit, or a null, encodes as all zeros.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Option<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            categories: None,
        }
    }

    /// Learned categories for `column`, once fitted.
    pub fn categories_for(&self, column: &str) -> Option<&[String]> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.categories.as_ref().map(|cats| cats[idx].as_slice())
    }
}

fn sorted_categories(seen: BTreeSet<String>) -> Vec<String> {
    let numeric: Option<Vec<(f64, String)>> = seen
        .iter()
        .map(|cat| cat.trim().parse::<f64>().ok().map(|v| (v, cat.clone())))
        .collect();

    match numeric {
        Some(mut pairs) => {
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            pairs.into_iter().map(|(_, cat)| cat).collect()
        }
        None => seen.into_iter().collect(),
    }
}

impl Transformer for OneHotEncoder {
    fn name(&self) -> &str {
        "one_hot_encoder"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut categories = Vec::with_capacity(self.columns.len());

        for col in &self.columns {
            let seen: BTreeSet<String> = string_values(df, col)?.into_iter().flatten().collect();
            if seen.is_empty() {
                return Err(ClaimsError::NoValidValues(col.clone()));
            }
            debug!("one_hot_encoder: '{}' has {} categories", col, seen.len());
            categories.push(sorted_categories(seen));
        }

        self.categories = Some(categories);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let categories = self
            .categories
            .as_ref()
            .ok_or_else(|| ClaimsError::NotFitted(self.name().to_string()))?;

        let mut columns = Vec::new();
        for (col, cats) in self.columns.iter().zip(categories) {
            let values = string_values(df, col)?;
            for cat in cats {
                let indicator: Vec<f64> = values
                    .iter()
                    .map(|v| if v.as_deref() == Some(cat.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                let name = format!("{}_{}", col, cat);
                columns.push(Series::new(name.into(), indicator).into_column());
            }
        }

        Ok(DataFrame::new(columns)?)
    }

    fn is_fitted(&self) -> bool {
        self.categories.is_some()
    }
}
