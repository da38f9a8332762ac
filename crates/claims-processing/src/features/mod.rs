//! Feature engineering on cleaned claims.
//!
//! Takes the output of [`crate::cleaner::clean_data`] and produces the model
//! feature table: imputed categoricals, Incurred outliers removed, Y/N flags
//! as 0/1 integers, a night-time flag, and aggregate third-party counts.

mod derived;
mod outliers;

pub use outliers::OutlierHandler;

use crate::columns::*;
use crate::config::ClaimsConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::schema::StageSchema;
use crate::types::{ActionType, IndexedFrame, PreprocessingAction, ProcessingSummary};
use crate::utils::drop_columns;
use derived::NullPolicy;
use polars::prelude::*;
use tracing::{debug, info};

/// Categorical columns whose nulls are filled with the column mode.
const MODE_IMPUTED_COLUMNS: [&str; 3] = [LOCATION_OF_INCIDENT, WEATHER_CONDITIONS, VEHICLE_MOBILE];

/// Y/N columns turned into 0/1 integers.
const BINARY_FLAG_COLUMNS: [&str; 2] = [VEHICLE_MOBILE, MAIN_DRIVER];

/// Derive model features from a cleaned claims table.
///
/// The input is not modified. Statistics (modes, Incurred mean and standard
/// deviation) are computed over the rows passed in, so results depend on the
/// batch.
pub fn pre_process_data(data: &IndexedFrame, config: &ClaimsConfig) -> Result<IndexedFrame> {
    let mut summary = ProcessingSummary::new();
    FeatureEngineer::new(config).engineer(data, &mut summary)
}

/// Feature engineering stage over cleaned claims.
pub struct FeatureEngineer<'a> {
    config: &'a ClaimsConfig,
}

impl<'a> FeatureEngineer<'a> {
    pub fn new(config: &'a ClaimsConfig) -> Self {
        Self { config }
    }

    /// Run every feature step in order, recording actions in `summary`.
    pub fn engineer(
        &self,
        data: &IndexedFrame,
        summary: &mut ProcessingSummary,
    ) -> Result<IndexedFrame> {
        info!("Engineering features for {} claims...", data.height());

        StageSchema::cleaned_claims(self.config)
            .check(data.frame())
            .context("pre_process_data input")?;

        let index = data.index_name();
        let mut df = data.frame().clone();

        // 1. Fault flag is not used as a feature
        df = drop_columns(df, &[PH_CONSIDERED_TP_AT_FAULT])?;
        summary.add_action(PreprocessingAction::new(
            ActionType::ColumnRemoved,
            PH_CONSIDERED_TP_AT_FAULT,
            "Not used as a feature",
        ));

        // 2. Mode imputation
        for col in MODE_IMPUTED_COLUMNS {
            StatisticalImputer::apply_mode_imputation(&mut df, col, summary)?;
        }

        // 3. Incurred outliers
        OutlierHandler::remove_zscore_outliers(
            &mut df,
            INCURRED,
            self.config.outlier_z_threshold,
            self.config.outlier_tail,
            summary,
        )?;

        // 4. Y/N -> 1/0
        self.binarize_flags(&mut df, summary)?;

        // 5. Hour -> night flag
        df = self.derive_is_night(df, summary)?;

        // 6-7. Group aggregates
        df = self.derive_total_from_regions(df, summary)?;
        df = self.derive_severe_injuries(df, summary)?;

        let features = IndexedFrame::from_parts_unchecked(df, index.into());
        info!(
            "Feature engineering complete: {} rows, {} columns",
            features.height(),
            features.width()
        );
        Ok(features)
    }

    fn binarize_flags(&self, df: &mut DataFrame, summary: &mut ProcessingSummary) -> Result<()> {
        for col in BINARY_FLAG_COLUMNS {
            let flags = derived::binarize(df, col, &self.config.yes_value)?;
            df.replace(col, flags)?;
            summary.add_action(PreprocessingAction::new(
                ActionType::ValueCleaned,
                col,
                format!("Encoded '{}' as 1, everything else as 0", self.config.yes_value),
            ));
        }
        debug!("Binarized {:?}", BINARY_FLAG_COLUMNS);
        Ok(())
    }

    fn derive_is_night(&self, mut df: DataFrame, summary: &mut ProcessingSummary) -> Result<DataFrame> {
        let (start, end) = (self.config.night_start_hour, self.config.night_end_hour);
        let flags = derived::night_flag(&df, TIME_HOUR, start, end, IS_NIGHT)?;
        let nights = flags.i32()?.into_no_null_iter().filter(|f| *f == 1).count();

        df.with_column(flags)?;
        let df = drop_columns(df, &[TIME_HOUR])?;

        summary.add_action(
            PreprocessingAction::new(
                ActionType::ColumnDerived,
                IS_NIGHT,
                format!("Derived from {} (>= {} or <= {})", TIME_HOUR, start, end),
            )
            .with_details(format!("{} night-time claims", nights)),
        );
        summary.add_action(PreprocessingAction::new(
            ActionType::ColumnRemoved,
            TIME_HOUR,
            format!("Replaced by {}", IS_NIGHT),
        ));
        debug!("Derived {}: {} night-time claims", IS_NIGHT, nights);
        Ok(df)
    }

    fn derive_total_from_regions(
        &self,
        mut df: DataFrame,
        summary: &mut ProcessingSummary,
    ) -> Result<DataFrame> {
        let groups = &self.config.groups;
        let total = derived::row_sum(&df, &groups.regions_sum, TOTAL_FROM_REGIONS, NullPolicy::Zero)?;
        df.with_column(total)?;
        let df = drop_columns(df, &groups.regions_drop)?;

        summary.add_action(PreprocessingAction::new(
            ActionType::ColumnDerived,
            TOTAL_FROM_REGIONS,
            format!("Sum of {} columns, missing counted as 0", groups.regions_sum.len()),
        ));
        self.record_group_drop(&groups.regions_drop, TOTAL_FROM_REGIONS, summary);
        Ok(df)
    }

    fn derive_severe_injuries(
        &self,
        mut df: DataFrame,
        summary: &mut ProcessingSummary,
    ) -> Result<DataFrame> {
        let groups = &self.config.groups;
        let severe = derived::row_sum(
            &df,
            &groups.severe_injuries,
            TP_SEVERE_INJURIES,
            NullPolicy::Propagate,
        )?;
        let missing = severe.null_count();
        df.with_column(severe)?;
        let df = drop_columns(df, &groups.injury_drop)?;

        summary.add_action(
            PreprocessingAction::new(
                ActionType::ColumnDerived,
                TP_SEVERE_INJURIES,
                format!("Sum of {:?}", groups.severe_injuries),
            )
            .with_details(format!("{} rows with a missing component", missing)),
        );
        self.record_group_drop(&groups.injury_drop, TP_SEVERE_INJURIES, summary);
        Ok(df)
    }

    fn record_group_drop(&self, columns: &[String], derived: &str, summary: &mut ProcessingSummary) {
        for col in columns {
            summary.add_action(PreprocessingAction::new(
                ActionType::ColumnRemoved,
                col.as_str(),
                format!("Aggregated into {}", derived),
            ));
        }
        debug!("Dropped {} columns after deriving {}", columns.len(), derived);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnGroups;

    /// Cleaned-stage frame with `n` rows, Incurred = 100 * (i + 1).
    fn cleaned(n: usize) -> IndexedFrame {
        let ids: Vec<String> = (0..n).map(|i| format!("C{}", i)).collect();
        let incurred: Vec<f64> = (0..n).map(|i| 100.0 * (i + 1) as f64).collect();
        let hours: Vec<Option<i64>> = (0..n).map(|i| Some(((i * 7) % 24) as i64)).collect();

        let mut columns = vec![
            Column::new(CLAIM_NUMBER.into(), ids),
            Column::new(DAYS_SINCE_LOSS.into(), vec![10i64; n]),
            Column::new(TIME_HOUR.into(), hours),
            Column::new(NOTIFICATION_PERIOD.into(), vec![3.0; n]),
            Column::new(INCURRED.into(), incurred),
            Column::new(
                LOCATION_OF_INCIDENT.into(),
                (0..n).map(|i| if i == 0 { None } else { Some("Main ROAD") }).collect::<Vec<_>>(),
            ),
            Column::new(
                WEATHER_CONDITIONS.into(),
                (0..n).map(|i| if i % 2 == 0 { Some("WET") } else { None }).collect::<Vec<_>>(),
            ),
            Column::new(
                VEHICLE_MOBILE.into(),
                (0..n).map(|i| if i == 1 { None } else { Some("Y") }).collect::<Vec<_>>(),
            ),
            Column::new(MAIN_DRIVER.into(), vec!["Y"; n]),
            Column::new(PH_CONSIDERED_TP_AT_FAULT.into(), vec!["N"; n]),
        ];
        for col in ColumnGroups::standard().all_columns() {
            columns.push(Column::new(col.into(), vec![1i64; n]));
        }

        let df = DataFrame::new(columns).unwrap();
        IndexedFrame::set_index(df, CLAIM_NUMBER).unwrap()
    }

    #[test]
    fn test_engineered_columns() {
        let data = cleaned(5);
        let features = pre_process_data(&data, &ClaimsConfig::default()).unwrap();
        let names = features.feature_names();

        for removed in [PH_CONSIDERED_TP_AT_FAULT, TIME_HOUR] {
            assert!(!names.iter().any(|n| n == removed));
        }
        for col in TP_REGION_COLS.iter().chain(TP_INJURY_COLS.iter()) {
            assert!(!names.iter().any(|n| n == col), "{} should be dropped", col);
        }
        for added in [IS_NIGHT, TOTAL_FROM_REGIONS, TP_SEVERE_INJURIES] {
            assert!(names.iter().any(|n| n == added));
        }

        let total = features.column(TOTAL_FROM_REGIONS).unwrap().f64().unwrap();
        assert_eq!(total.get(0), Some(TP_TYPE_COLS.len() as f64));
        let severe = features.column(TP_SEVERE_INJURIES).unwrap().f64().unwrap();
        assert_eq!(severe.get(0), Some(3.0));
    }

    #[test]
    fn test_imputation_and_flags() {
        let data = cleaned(5);
        let features = pre_process_data(&data, &ClaimsConfig::default()).unwrap();

        for col in [LOCATION_OF_INCIDENT, WEATHER_CONDITIONS] {
            assert_eq!(features.column(col).unwrap().null_count(), 0);
        }
        assert_eq!(
            features.column(WEATHER_CONDITIONS).unwrap().str().unwrap().get(1),
            Some("WET")
        );

        let mobile = features.column(VEHICLE_MOBILE).unwrap();
        assert_eq!(mobile.dtype(), &DataType::Int32);
        // null filled with mode "Y", then encoded
        let mobile: Vec<i32> = mobile.i32().unwrap().into_no_null_iter().collect();
        assert!(mobile.iter().all(|v| *v == 1));
    }

    #[test]
    fn test_configured_night_window() {
        // hours 0, 7, 14, 21, 4
        let data = cleaned(5);
        let config = ClaimsConfig::builder().night_hours(1, 5).build().unwrap();
        let features = pre_process_data(&data, &config).unwrap();

        let night: Vec<i32> = features
            .column(IS_NIGHT)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(night, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let data = cleaned(5);
        let before = data.frame().clone();

        pre_process_data(&data, &ClaimsConfig::default()).unwrap();
        assert!(data.frame().equals_missing(&before));
    }

    #[test]
    fn test_index_survives_outlier_removal() {
        // 19 small claims and one huge one
        let mut data = cleaned(20).into_frame();
        let mut incurred: Vec<f64> = vec![100.0; 19];
        incurred[0] = 90.0;
        incurred.push(1_000_000.0);
        data.replace(INCURRED, Series::new(INCURRED.into(), incurred)).unwrap();
        let data = IndexedFrame::set_index(data, CLAIM_NUMBER).unwrap();

        let features = pre_process_data(&data, &ClaimsConfig::default()).unwrap();
        assert_eq!(features.height(), 19);
        assert_eq!(features.index_name(), CLAIM_NUMBER);
        let ids: Vec<&str> = features.index().unwrap().str().unwrap().into_iter().flatten().collect();
        assert!(!ids.contains(&"C19"));
    }

    #[test]
    fn test_rejects_raw_input() {
        let data = cleaned(3).into_frame();
        let data = IndexedFrame::set_index(
            drop_columns(data, &[DAYS_SINCE_LOSS]).unwrap(),
            CLAIM_NUMBER,
        )
        .unwrap();

        let err = pre_process_data(&data, &ClaimsConfig::default()).unwrap_err();
        assert!(err.is_missing_column());
    }

    #[test]
    fn test_summary_records_steps() {
        let data = cleaned(5);
        let config = ClaimsConfig::default();
        let mut summary = ProcessingSummary::new();

        FeatureEngineer::new(&config).engineer(&data, &mut summary).unwrap();
        assert_eq!(summary.actions_of(ActionType::ValueImputed).count(), 3);
        assert_eq!(summary.actions_of(ActionType::OutlierHandled).count(), 1);
        assert!(summary.actions_of(ActionType::ColumnDerived).count() >= 3);
    }
}
