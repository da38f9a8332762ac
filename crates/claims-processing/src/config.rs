//! Configuration for the claims cleaning and feature-engineering stages.
//!
//! All knobs live in [`ClaimsConfig`], which is immutable once built and is
//! passed by reference to every stage. Use [`ClaimsConfig::builder()`] for a
//! fluent setup or [`ClaimsConfig::from_json_file`] to load one from disk.

use crate::columns::{
    ColumnGroups, LOCATION_OF_INCIDENT, PH_CONSIDERED_TP_AT_FAULT, VEHICLE_MOBILE,
    WEATHER_CONDITIONS,
};
use crate::error::{ClaimsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which side of the z-score distribution the outlier filter bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ZScoreTail {
    /// Keep rows with z < threshold. Strongly negative z-scores are kept.
    #[default]
    Upper,
    /// Keep rows with |z| < threshold.
    Both,
}

/// Allowed values for a categorical column; anything else becomes null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDomain {
    pub column: String,
    pub allowed: Vec<String>,
}

impl CategoryDomain {
    pub fn new(column: impl Into<String>, allowed: &[&str]) -> Self {
        Self {
            column: column.into(),
            allowed: allowed.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.allowed.iter().any(|v| v == value)
    }
}

fn default_domains() -> Vec<CategoryDomain> {
    vec![
        CategoryDomain::new(
            LOCATION_OF_INCIDENT,
            &[
                "Minor Road",
                "Main Road",
                "Car Park",
                "Other",
                "Home Address",
                "Motorway",
            ],
        ),
        CategoryDomain::new(WEATHER_CONDITIONS, &["NORMAL", "WET", "SNOW,ICE,FOG"]),
        CategoryDomain::new(VEHICLE_MOBILE, &["Y", "N"]),
        CategoryDomain::new(PH_CONSIDERED_TP_AT_FAULT, &["Y", "N"]),
    ]
}

fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

/// Configuration for the claims stages.
///
/// # Example
///
/// ```rust,ignore
/// use claims_processing::config::{ClaimsConfig, ZScoreTail};
///
/// let config = ClaimsConfig::builder()
///     .outlier_z_threshold(3.0)
///     .outlier_tail(ZScoreTail::Both)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    /// Column groups used for aggregation and dropping.
    pub groups: ColumnGroups,

    /// Categorical domains enforced during cleaning.
    pub domains: Vec<CategoryDomain>,

    /// The "yes" sentinel used by `Main_driver` and the binarized columns.
    /// Default: "Y"
    pub yes_value: String,

    /// Value `Main_driver` falls back to when it is not `yes_value`.
    /// Default: "N"
    pub no_value: String,

    /// chrono formats tried in order when the loss date is stored as text.
    pub date_formats: Vec<String>,

    /// Rows with a z-score on `Incurred` at or above this are removed.
    /// Default: 2.0
    pub outlier_z_threshold: f64,

    /// Default: Upper
    pub outlier_tail: ZScoreTail,

    /// First hour (inclusive) counted as night. Default: 20
    pub night_start_hour: u32,

    /// Last hour (inclusive) counted as night. Default: 5
    pub night_end_hour: u32,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            groups: ColumnGroups::default(),
            domains: default_domains(),
            yes_value: "Y".to_string(),
            no_value: "N".to_string(),
            date_formats: default_date_formats(),
            outlier_z_threshold: 2.0,
            outlier_tail: ZScoreTail::default(),
            night_start_hour: 20,
            night_end_hour: 5,
        }
    }
}

impl ClaimsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClaimsConfigBuilder {
        ClaimsConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ClaimsConfig = serde_json::from_str(&raw)?;
        config
            .validate()
            .map_err(|e| ClaimsError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Domain for a column, if one is configured.
    pub fn domain(&self, column: &str) -> Option<&CategoryDomain> {
        self.domains.iter().find(|d| d.column == column)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !self.outlier_z_threshold.is_finite() || self.outlier_z_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidZThreshold(
                self.outlier_z_threshold,
            ));
        }

        for (field, hour) in [
            ("night_start_hour", self.night_start_hour),
            ("night_end_hour", self.night_end_hour),
        ] {
            if hour > 23 {
                return Err(ConfigValidationError::InvalidHour {
                    field: field.to_string(),
                    value: hour,
                });
            }
        }

        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        if let Some(domain) = self.domains.iter().find(|d| d.allowed.is_empty()) {
            return Err(ConfigValidationError::EmptyDomain(domain.column.clone()));
        }

        if self.yes_value == self.no_value {
            return Err(ConfigValidationError::AmbiguousSentinel(
                self.yes_value.clone(),
            ));
        }

        if self.groups.regions_sum.is_empty() || self.groups.severe_injuries.is_empty() {
            return Err(ConfigValidationError::EmptyGroup);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier z threshold: {0} (must be a positive number)")]
    InvalidZThreshold(f64),

    #[error("Invalid hour for '{field}': {value} (must be between 0 and 23)")]
    InvalidHour { field: String, value: u32 },

    #[error("At least one date format is required")]
    NoDateFormats,

    #[error("Domain for column '{0}' has no allowed values")]
    EmptyDomain(String),

    #[error("yes and no sentinels are both '{0}'")]
    AmbiguousSentinel(String),

    #[error("Aggregation groups must not be empty")]
    EmptyGroup,
}

impl From<ConfigValidationError> for ClaimsError {
    fn from(e: ConfigValidationError) -> Self {
        ClaimsError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`ClaimsConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ClaimsConfigBuilder {
    groups: Option<ColumnGroups>,
    domains: Option<Vec<CategoryDomain>>,
    yes_value: Option<String>,
    no_value: Option<String>,
    date_formats: Option<Vec<String>>,
    outlier_z_threshold: Option<f64>,
    outlier_tail: Option<ZScoreTail>,
    night_start_hour: Option<u32>,
    night_end_hour: Option<u32>,
}

impl ClaimsConfigBuilder {
    /// Replace the column groups.
    pub fn groups(mut self, groups: ColumnGroups) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Replace the categorical domains.
    pub fn domains(mut self, domains: Vec<CategoryDomain>) -> Self {
        self.domains = Some(domains);
        self
    }

    pub fn yes_value(mut self, value: impl Into<String>) -> Self {
        self.yes_value = Some(value.into());
        self
    }

    pub fn no_value(mut self, value: impl Into<String>) -> Self {
        self.no_value = Some(value.into());
        self
    }

    /// Set the chrono formats tried when parsing the loss date.
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Set the z-score threshold for `Incurred` outlier removal.
    pub fn outlier_z_threshold(mut self, threshold: f64) -> Self {
        self.outlier_z_threshold = Some(threshold);
        self
    }

    pub fn outlier_tail(mut self, tail: ZScoreTail) -> Self {
        self.outlier_tail = Some(tail);
        self
    }

    /// Set the inclusive night window, e.g. `(20, 5)` for 20:00-05:59.
    ///
    /// A start after the end wraps past midnight; `(1, 5)` covers 01:00-05:59.
    pub fn night_hours(mut self, start: u32, end: u32) -> Self {
        self.night_start_hour = Some(start);
        self.night_end_hour = Some(end);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ClaimsConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<ClaimsConfig, ConfigValidationError> {
        let defaults = ClaimsConfig::default();
        let config = ClaimsConfig {
            groups: self.groups.unwrap_or(defaults.groups),
            domains: self.domains.unwrap_or(defaults.domains),
            yes_value: self.yes_value.unwrap_or(defaults.yes_value),
            no_value: self.no_value.unwrap_or(defaults.no_value),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            outlier_z_threshold: self
                .outlier_z_threshold
                .unwrap_or(defaults.outlier_z_threshold),
            outlier_tail: self.outlier_tail.unwrap_or_default(),
            night_start_hour: self.night_start_hour.unwrap_or(defaults.night_start_hour),
            night_end_hour: self.night_end_hour.unwrap_or(defaults.night_end_hour),
        };

        config.validate()?;
        Ok(config)
    }
}
