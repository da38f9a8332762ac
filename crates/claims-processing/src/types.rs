use crate::error::{ClaimsError, Result};
use crate::utils::column_series;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Indexed Frame
// ============================================================================

/// A DataFrame whose rows are identified by a unique, non-null index column.
///
/// The index column is always the first column of the frame. Stages keep it
/// untouched so row identity survives every transform and downstream joins
/// can key on it.
#[derive(Debug, Clone)]
pub struct IndexedFrame {
    frame: DataFrame,
    index: PlSmallStr,
}

impl IndexedFrame {
    /// Promote `column` to the index.
    ///
    /// Fails if the column is absent, contains nulls, or contains duplicates.
    pub fn set_index(df: DataFrame, column: &str) -> Result<Self> {
        let series = column_series(&df, column)?;

        if series.null_count() > 0 {
            return Err(ClaimsError::InvalidIndex {
                column: column.to_string(),
                reason: format!("{} null values", series.null_count()),
            });
        }

        let unique = series.n_unique()?;
        if unique != series.len() {
            return Err(ClaimsError::InvalidIndex {
                column: column.to_string(),
                reason: format!("{} duplicate values", series.len() - unique),
            });
        }

        let mut order: Vec<PlSmallStr> = vec![column.into()];
        order.extend(
            df.get_column_names()
                .into_iter()
                .filter(|name| name.as_str() != column)
                .cloned(),
        );
        let frame = df.select(order)?;

        Ok(Self {
            frame,
            index: column.into(),
        })
    }

    /// Wrap a frame whose index column is already first and valid.
    ///
    /// Only used by stages that filter rows or touch non-index columns.
    pub(crate) fn from_parts_unchecked(frame: DataFrame, index: PlSmallStr) -> Self {
        Self { frame, index }
    }

    /// Name of the index column.
    pub fn index_name(&self) -> &str {
        self.index.as_str()
    }

    /// The index column values.
    pub fn index(&self) -> Result<&Series> {
        column_series(&self.frame, &self.index)
    }

    /// Borrow the frame, index column included.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Take the frame, index column included.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of non-index columns.
    pub fn width(&self) -> usize {
        self.frame.width().saturating_sub(1)
    }

    /// Names of the non-index columns, in frame order.
    pub fn feature_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .filter(|name| **name != self.index)
            .map(|name| name.to_string())
            .collect()
    }

    /// Borrow a non-index column.
    pub fn column(&self, name: &str) -> Result<&Series> {
        column_series(&self.frame, name)
    }
}

// ============================================================================
// Processing Summary Types
// ============================================================================

/// Audit trail of one pipeline run.
///
/// # Example
///
/// ```rust,ignore
/// let result = pipeline.process(df)?;
/// let summary = &result.summary;
/// println!("Kept {} of {} claims in {}ms",
///     summary.rows_after, summary.rows_before, summary.duration_ms);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,

    pub columns_before: usize,
    pub columns_after: usize,

    /// Actions taken, in execution order.
    pub actions: Vec<PreprocessingAction>,

    /// Notes about suspicious data that did not stop the run.
    pub warnings: Vec<String>,
}

impl ProcessingSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: PreprocessingAction) {
        self.actions.push(action);
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Actions of a given type.
    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &PreprocessingAction> {
        self.actions
            .iter()
            .filter(move |a| a.action_type == action_type)
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f32 / self.rows_before as f32) * 100.0
        }
    }
}

/// A single action taken during processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingAction {
    pub action_type: ActionType,
    /// Target of the action (column name or "dataset").
    pub target: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl PreprocessingAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions recorded during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A column was removed from the dataset.
    ColumnRemoved,
    /// A new column was derived from existing ones.
    ColumnDerived,
    /// Rows failing a validity check were removed.
    RowsRemoved,
    /// Missing values were imputed.
    ValueImputed,
    /// Out-of-domain values were replaced.
    ValueCleaned,
    /// Outlier rows were removed.
    OutlierHandled,
    /// A categorical column was encoded as numbers.
    CategoriesEncoded,
    /// A column was promoted to the index.
    IndexSet,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnRemoved => "Column Removed",
            Self::ColumnDerived => "Column Derived",
            Self::RowsRemoved => "Rows Removed",
            Self::ValueImputed => "Value Imputed",
            Self::ValueCleaned => "Value Cleaned",
            Self::OutlierHandled => "Outlier Handled",
            Self::CategoriesEncoded => "Categories Encoded",
            Self::IndexSet => "Index Set",
        }
    }
}

/// Output of a [`crate::ClaimsPipeline`] run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The feature table, indexed by claim number.
    pub features: IndexedFrame,
    pub summary: ProcessingSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_index_moves_column_first() {
        let df = df![
            "value" => [1.0, 2.0],
            "id" => ["c1", "c2"],
        ]
        .unwrap();

        let indexed = IndexedFrame::set_index(df, "id").unwrap();
        assert_eq!(indexed.index_name(), "id");
        assert_eq!(indexed.frame().get_column_names()[0].as_str(), "id");
        assert_eq!(indexed.feature_names(), vec!["value".to_string()]);
        assert_eq!(indexed.width(), 1);
        assert_eq!(indexed.height(), 2);
    }

    #[test]
    fn test_set_index_rejects_duplicates() {
        let df = df!["id" => [1, 1, 2]].unwrap();
        let err = IndexedFrame::set_index(df, "id").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INDEX");
        assert!(err.to_string().contains("1 duplicate"));
    }

    #[test]
    fn test_set_index_rejects_nulls() {
        let df = df!["id" => [Some(1), None]].unwrap();
        let err = IndexedFrame::set_index(df, "id").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INDEX");
    }

    #[test]
    fn test_set_index_missing_column() {
        let df = df!["other" => [1]].unwrap();
        let err = IndexedFrame::set_index(df, "id").unwrap_err();
        assert!(err.is_missing_column());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ProcessingSummary::new();
        summary.rows_before = 200;
        summary.rows_removed = 50;
        summary.add_action(PreprocessingAction::new(
            ActionType::RowsRemoved,
            "dataset",
            "Removed 50 rows",
        ));
        summary.add_action(
            PreprocessingAction::new(ActionType::ColumnRemoved, "Loss_code", "Dropped")
                .with_details("irrelevant"),
        );

        assert_eq!(summary.rows_removed_percentage(), 25.0);
        assert_eq!(summary.actions_of(ActionType::RowsRemoved).count(), 1);
        assert_eq!(ActionType::IndexSet.display_name(), "Index Set");
    }

    #[test]
    fn test_action_serialization() {
        let action = PreprocessingAction::new(ActionType::ValueImputed, "Weather_conditions", "mode");
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("value_imputed"));
        assert!(!json.contains("details"));
    }
}
