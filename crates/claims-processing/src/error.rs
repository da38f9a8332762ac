//! Error types for the claims processing stages.
//!
//! Every stage propagates the first failure it meets; nothing is recovered
//! locally. Errors carry a stable code so a batch driver (or anything that
//! serializes them) can tell the failure classes apart.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for claims cleaning, feature engineering and transforms.
#[derive(Error, Debug)]
pub enum ClaimsError {
    /// A referenced column is absent from the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column exists but its dtype does not fit the expected semantic type.
    #[error("Column '{column}' has dtype {found}, expected {expected}")]
    SchemaMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A date value could not be parsed with any configured format.
    #[error("Failed to parse '{value}' in column '{column}' as a date")]
    DateParse { column: String, value: String },

    /// The index column contains duplicates or nulls.
    #[error("Cannot use '{column}' as index: {reason}")]
    InvalidIndex { column: String, reason: String },

    /// A statistic (mode, mean, standard deviation) is undefined for the data.
    #[error("Degenerate statistics in column '{column}': {reason}")]
    DegenerateStatistics { column: String, reason: String },

    /// No non-null values were available to fit on.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// A transform was applied before it was fit.
    #[error("Transformer '{0}' used before fit")]
    NotFitted(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with the stage it happened in.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ClaimsError>,
    },
}

impl ClaimsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ClaimsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through context wrapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::DateParse { .. } => "DATE_PARSE",
            Self::InvalidIndex { .. } => "INVALID_INDEX",
            Self::DegenerateStatistics { .. } => "DEGENERATE_STATISTICS",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, skipping context layers.
    pub fn root(&self) -> &ClaimsError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error is a missing-column failure.
    pub fn is_missing_column(&self) -> bool {
        matches!(self.root(), Self::ColumnNotFound(_))
    }
}

/// Errors are serialized as `{ "code": ..., "message": ... }`.
impl Serialize for ClaimsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ClaimsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for claims operations.
pub type Result<T> = std::result::Result<T, ClaimsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ClaimsError::Polars(e).with_context(context))
    }
}
