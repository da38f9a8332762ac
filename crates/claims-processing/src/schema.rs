//! Stage-boundary schemas.
//!
//! A [`StageSchema`] maps column names to the semantic type a stage expects.
//! Stages check their input against one before touching any data, so a
//! missing or mistyped column is reported up front instead of halfway
//! through a transform.

use crate::columns::*;
use crate::config::ClaimsConfig;
use crate::error::{ClaimsError, Result};
use crate::utils::{is_datetime_dtype, is_numeric_dtype, is_string_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What a column means to the pipeline, independent of its storage dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Row identifier; any dtype.
    Identifier,
    Numeric,
    Categorical,
    /// Text to be parsed, or an already typed date/datetime.
    Date,
    /// 0/1 or count indicators.
    Binary,
}

impl SemanticType {
    /// Whether a storage dtype can hold this semantic type.
    pub fn accepts(&self, dtype: &DataType) -> bool {
        match self {
            Self::Identifier => true,
            Self::Numeric | Self::Binary => is_numeric_dtype(dtype),
            Self::Categorical => is_string_dtype(dtype) || matches!(dtype, DataType::Null),
            Self::Date => {
                is_datetime_dtype(dtype)
                    || matches!(dtype, DataType::String | DataType::Null)
            }
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::Identifier => "any",
            Self::Numeric => "numeric",
            Self::Binary => "numeric indicator",
            Self::Categorical => "string",
            Self::Date => "date, datetime or string",
        }
    }
}

/// Ordered mapping from column name to semantic type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSchema {
    columns: Vec<(String, SemanticType)>,
}

impl StageSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column.
    pub fn with(mut self, column: impl Into<String>, semantic: SemanticType) -> Self {
        let column = column.into();
        if let Some(entry) = self.columns.iter_mut().find(|(name, _)| *name == column) {
            entry.1 = semantic;
        } else {
            self.columns.push((column, semantic));
        }
        self
    }

    fn with_all<'a>(
        mut self,
        columns: impl IntoIterator<Item = &'a str>,
        semantic: SemanticType,
    ) -> Self {
        for col in columns {
            self = self.with(col, semantic);
        }
        self
    }

    /// Semantic type of a column, if the schema names it.
    pub fn get(&self, column: &str) -> Option<SemanticType> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, semantic)| *semantic)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns a raw claims extract must carry for cleaning.
    pub fn raw_claims(config: &ClaimsConfig) -> Self {
        Self::new()
            .with(CLAIM_NUMBER, SemanticType::Identifier)
            .with(DATE_OF_LOSS, SemanticType::Date)
            .with(LOSS_CODE, SemanticType::Identifier)
            .with(LOSS_DESCRIPTION, SemanticType::Identifier)
            .with(CAPPED_INCURRED, SemanticType::Identifier)
            .with(VEHICLE_REGISTRATION_PRESENT, SemanticType::Identifier)
            .with_shared(config)
            .with(PH_CONSIDERED_TP_AT_FAULT, SemanticType::Categorical)
    }

    /// Columns the feature-engineering stage expects from the cleaning stage.
    pub fn cleaned_claims(config: &ClaimsConfig) -> Self {
        Self::new()
            .with(DAYS_SINCE_LOSS, SemanticType::Numeric)
            .with_shared(config)
            .with(PH_CONSIDERED_TP_AT_FAULT, SemanticType::Categorical)
    }

    fn with_shared(self, config: &ClaimsConfig) -> Self {
        self.with(TIME_HOUR, SemanticType::Numeric)
            .with(NOTIFICATION_PERIOD, SemanticType::Numeric)
            .with(INCURRED, SemanticType::Numeric)
            .with(LOCATION_OF_INCIDENT, SemanticType::Categorical)
            .with(WEATHER_CONDITIONS, SemanticType::Categorical)
            .with(VEHICLE_MOBILE, SemanticType::Categorical)
            .with(MAIN_DRIVER, SemanticType::Categorical)
            .with_all(config.groups.all_columns(), SemanticType::Binary)
    }

    /// Check presence and dtype of every column, in schema order.
    pub fn check(&self, df: &DataFrame) -> Result<()> {
        for (name, semantic) in &self.columns {
            let column = df
                .column(name)
                .map_err(|_| ClaimsError::ColumnNotFound(name.clone()))?;

            if !semantic.accepts(column.dtype()) {
                return Err(ClaimsError::SchemaMismatch {
                    column: name.clone(),
                    expected: semantic.expected().to_string(),
                    found: column.dtype().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        assert!(SemanticType::Numeric.accepts(&DataType::Int64));
        assert!(!SemanticType::Numeric.accepts(&DataType::String));
        assert!(SemanticType::Categorical.accepts(&DataType::String));
        assert!(SemanticType::Categorical.accepts(&DataType::Null));
        assert!(SemanticType::Date.accepts(&DataType::Date));
        assert!(SemanticType::Date.accepts(&DataType::String));
        assert!(!SemanticType::Date.accepts(&DataType::Float64));
        assert!(SemanticType::Identifier.accepts(&DataType::Boolean));
    }

    #[test]
    fn test_with_replaces_existing() {
        let schema = StageSchema::new()
            .with("a", SemanticType::Numeric)
            .with("a", SemanticType::Categorical);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("a"), Some(SemanticType::Categorical));
    }

    #[test]
    fn test_check_missing_column() {
        let schema = StageSchema::new().with("Incurred", SemanticType::Numeric);
        let df = df!["other" => [1.0]].unwrap();
        let err = schema.check(&df).unwrap_err();
        assert!(matches!(err, ClaimsError::ColumnNotFound(ref c) if c == "Incurred"));
    }

    #[test]
    fn test_check_type_mismatch() {
        let schema = StageSchema::new().with("Incurred", SemanticType::Numeric);
        let df = df!["Incurred" => ["lots"]].unwrap();
        let err = schema.check(&df).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_raw_schema_covers_groups() {
        let config = ClaimsConfig::default();
        let schema = StageSchema::raw_claims(&config);
        assert_eq!(schema.get("TP_region_london"), Some(SemanticType::Binary));
        assert_eq!(schema.get(CLAIM_NUMBER), Some(SemanticType::Identifier));
        assert_eq!(schema.get(CAPPED_INCURRED), Some(SemanticType::Identifier));
        assert_eq!(schema.get(DAYS_SINCE_LOSS), None);
    }

    #[test]
    fn test_cleaned_schema_drops_raw_only_columns() {
        let config = ClaimsConfig::default();
        let schema = StageSchema::cleaned_claims(&config);
        assert_eq!(schema.get(DATE_OF_LOSS), None);
        assert_eq!(schema.get(LOSS_CODE), None);
        assert_eq!(schema.get(DAYS_SINCE_LOSS), Some(SemanticType::Numeric));
    }
}
