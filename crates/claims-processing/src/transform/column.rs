//! Sequential chains and parallel column branches.

use super::Transformer;
use crate::error::{ClaimsError, Result};
use crate::utils::require_columns;
use polars::prelude::*;
use tracing::debug;

/// Transformers applied one after another, each fed the previous output.
pub struct TransformChain {
    steps: Vec<Box<dyn Transformer>>,
}

impl TransformChain {
    pub fn new(steps: Vec<Box<dyn Transformer>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transformer for TransformChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut current = df.clone();
        let last = self.steps.len().saturating_sub(1);

        for (i, step) in self.steps.iter_mut().enumerate() {
            if i == last {
                step.fit(&current)?;
            } else {
                current = step.fit_transform(&current)?;
            }
        }
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = df.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }

    fn is_fitted(&self) -> bool {
        self.steps.iter().all(|step| step.is_fitted())
    }
}

/// A named column subset routed through its own chain.
pub struct Branch {
    name: String,
    columns: Vec<String>,
    chain: TransformChain,
}

impl Branch {
    pub fn new(name: impl Into<String>, columns: Vec<String>, chain: TransformChain) -> Self {
        Self {
            name: name.into(),
            columns,
            chain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn select(&self, df: &DataFrame) -> Result<DataFrame> {
        require_columns(df, &self.columns)?;
        Ok(df.select(self.columns.iter().map(String::as_str))?)
    }

    fn output_name(&self, column: &str) -> String {
        format!("{}__{}", self.name, column)
    }
}

/// Branches applied side by side, outputs concatenated in branch order.
///
/// Output columns are named `<branch>__<column>`. Input columns that belong
/// to no branch are dropped.
pub struct ColumnTransformer {
    branches: Vec<Branch>,
    feature_names_out: Option<Vec<String>>,
}

impl ColumnTransformer {
    pub fn new(branches: Vec<Branch>) -> Self {
        Self {
            branches,
            feature_names_out: None,
        }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Output column names, available after fit.
    pub fn feature_names_out(&self) -> Option<&[String]> {
        self.feature_names_out.as_deref()
    }
}

impl Transformer for ColumnTransformer {
    fn name(&self) -> &str {
        "column_transformer"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut names = Vec::new();

        for branch in &mut self.branches {
            let subset = branch.select(df)?;
            let out = branch.chain.fit_transform(&subset)?;
            debug!(
                "Fitted branch '{}': {} columns in, {} out",
                branch.name,
                branch.columns.len(),
                out.width()
            );
            names.extend(
                out.get_column_names()
                    .into_iter()
                    .map(|col| branch.output_name(col.as_str())),
            );
        }

        self.feature_names_out = Some(names);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if self.feature_names_out.is_none() {
            return Err(ClaimsError::NotFitted(self.name().to_string()));
        }

        let mut columns = Vec::new();
        for branch in &self.branches {
            let out = branch.chain.transform(&branch.select(df)?)?;
            for col in out.get_columns() {
                let renamed = branch.output_name(col.name().as_str());
                columns.push(col.clone().with_name(renamed.into()));
            }
        }

        Ok(DataFrame::new(columns)?)
    }

    fn is_fitted(&self) -> bool {
        self.feature_names_out.is_some()
    }
}
