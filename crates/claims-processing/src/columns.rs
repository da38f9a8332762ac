//! Column names and column groups of the third-party claims dataset.
//!
//! Groups are plain data: they are built once, never mutated, and handed to
//! each stage through [`crate::ClaimsConfig`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const CLAIM_NUMBER: &str = "Claim Number";
pub const DATE_OF_LOSS: &str = "date_of_loss";
pub const DAYS_SINCE_LOSS: &str = "days_since_loss";
pub const TIME_HOUR: &str = "Time_hour";
pub const NOTIFICATION_PERIOD: &str = "Notification_period";
pub const INCURRED: &str = "Incurred";
pub const CAPPED_INCURRED: &str = "Capped Incurred";
pub const LOSS_CODE: &str = "Loss_code";
pub const LOSS_DESCRIPTION: &str = "Loss_description";
// Misspelled in the source data.
pub const VEHICLE_REGISTRATION_PRESENT: &str = "Vechile_registration_present";
pub const LOCATION_OF_INCIDENT: &str = "Location_of_incident";
pub const WEATHER_CONDITIONS: &str = "Weather_conditions";
pub const VEHICLE_MOBILE: &str = "Vehicle_mobile";
pub const MAIN_DRIVER: &str = "Main_driver";
pub const PH_CONSIDERED_TP_AT_FAULT: &str = "PH_considered_TP_at_fault";

pub const IS_NIGHT: &str = "is_night";
pub const TOTAL_FROM_REGIONS: &str = "total_from_regions";
pub const TP_SEVERE_INJURIES: &str = "TP_severe_injuries";

pub const TP_INJURY_WHIPLASH: &str = "TP_injury_whiplash";
pub const TP_INJURY_TRAUMATIC: &str = "TP_injury_traumatic";
pub const TP_INJURY_FATALITY: &str = "TP_injury_fatality";

pub const TP_TYPE_COLS: [&str; 9] = [
    "TP_type_insd_pass_back",
    "TP_type_insd_pass_front",
    "TP_type_driver",
    "TP_type_pass_back",
    "TP_type_pass_front",
    "TP_type_bike",
    "TP_type_cyclist",
    "TP_type_pedestrian",
    "TP_type_other",
];

pub const TP_INJURY_COLS: [&str; 5] = [
    TP_INJURY_WHIPLASH,
    TP_INJURY_TRAUMATIC,
    TP_INJURY_FATALITY,
    "TP_injury_unclear",
    "TP_injury_nil",
];

pub const TP_REGION_COLS: [&str; 12] = [
    "TP_region_eastang",
    "TP_region_eastmid",
    "TP_region_london",
    "TP_region_north",
    "TP_region_northw",
    "TP_region_outerldn",
    "TP_region_scotland",
    "TP_region_southe",
    "TP_region_southw",
    "TP_region_wales",
    "TP_region_westmid",
    "TP_region_yorkshire",
];

static STANDARD_GROUPS: Lazy<ColumnGroups> = Lazy::new(|| ColumnGroups {
    regions_sum: to_owned(&TP_TYPE_COLS),
    regions_drop: to_owned(&TP_REGION_COLS),
    injury_drop: to_owned(&TP_INJURY_COLS),
    severe_injuries: to_owned(&[TP_INJURY_TRAUMATIC, TP_INJURY_FATALITY, TP_INJURY_WHIPLASH]),
});

fn to_owned(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

/// Named column sets used for aggregation and dropping during feature engineering.
///
/// The summed and dropped region sets are kept separate on purpose: the
/// standard grouping sums the third-party *type* indicators into
/// `total_from_regions` but drops the *region* indicators. Both are
/// reproduced exactly as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGroups {
    /// Columns summed into `total_from_regions`.
    pub regions_sum: Vec<String>,
    /// Columns dropped after `total_from_regions` is derived.
    pub regions_drop: Vec<String>,
    /// Columns dropped after `TP_severe_injuries` is derived.
    pub injury_drop: Vec<String>,
    /// Columns added together into `TP_severe_injuries`.
    pub severe_injuries: Vec<String>,
}

impl ColumnGroups {
    /// The process-wide standard grouping.
    pub fn standard() -> &'static ColumnGroups {
        &STANDARD_GROUPS
    }

    /// Every column any group refers to, without duplicates, in first-seen order.
    pub fn all_columns(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for col in self
            .regions_sum
            .iter()
            .chain(&self.regions_drop)
            .chain(&self.injury_drop)
            .chain(&self.severe_injuries)
        {
            if !seen.contains(&col.as_str()) {
                seen.push(col.as_str());
            }
        }
        seen
    }
}

impl Default for ColumnGroups {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_groups_membership() {
        let groups = ColumnGroups::standard();
        assert_eq!(groups.regions_sum.len(), TP_TYPE_COLS.len());
        assert_eq!(groups.regions_drop.len(), TP_REGION_COLS.len());
        assert_eq!(groups.injury_drop.len(), 5);
        assert_eq!(
            groups.severe_injuries,
            vec!["TP_injury_traumatic", "TP_injury_fatality", "TP_injury_whiplash"]
        );
    }

    #[test]
    fn test_all_columns_deduplicates() {
        let groups = ColumnGroups::standard();
        let all = groups.all_columns();
        // severe injury columns are already part of the injury group
        assert_eq!(
            all.len(),
            TP_TYPE_COLS.len() + TP_REGION_COLS.len() + TP_INJURY_COLS.len()
        );
    }

    #[test]
    fn test_default_matches_standard() {
        assert_eq!(&ColumnGroups::default(), ColumnGroups::standard());
    }
}
