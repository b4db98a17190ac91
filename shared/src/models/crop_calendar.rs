//! Crop calendar: growing profiles for common crops and which of them suit
//! the sowing seasons of a given month.
//!
//! Months are 1-based (January = 1).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Growing season a crop is associated with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// Monsoon sowing, June to October
    Kharif,
    /// Winter sowing, November to March
    Rabi,
    /// March to June
    Summer,
    Monsoon,
    Winter,
    /// Grown year-round
    #[serde(rename = "all")]
    AllYear,
}

impl Season {
    /// Seasons with a sowing window, in recommendation order
    pub const SOWING: [Season; 3] = [Season::Kharif, Season::Rabi, Season::Summer];

    /// Months of the sowing window; descriptive seasons have none
    pub fn months(&self) -> &'static [u32] {
        match self {
            Season::Kharif => &[6, 7, 8, 9, 10],
            Season::Rabi => &[11, 12, 1, 2, 3],
            Season::Summer => &[3, 4, 5, 6],
            Season::Monsoon | Season::Winter | Season::AllYear => &[],
        }
    }

    pub fn includes_month(&self, month: u32) -> bool {
        self.months().contains(&month)
    }

    /// Sowing seasons open in `month`; March and June belong to two
    pub fn active_in(month: u32) -> Vec<Season> {
        Self::SOWING
            .into_iter()
            .filter(|season| season.includes_month(month))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WaterNeed {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Static growing profile of one crop
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CropProfile {
    pub key: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub growth_days: u32,
    pub water_need: WaterNeed,
    pub temp_range: &'static str,
    pub seasons: &'static [Season],
    /// From sowing to harvest
    pub stages: &'static [&'static str],
}

pub static CROP_DATABASE: [CropProfile; 8] = [
    CropProfile {
        key: "tomato",
        label: "Tomato",
        emoji: "🍅",
        growth_days: 80,
        water_need: WaterNeed::High,
        temp_range: "20-30°C",
        seasons: &[Season::Summer, Season::Monsoon],
        stages: &["Seedling", "Vegetative", "Flowering", "Fruiting", "Harvest"],
    },
    CropProfile {
        key: "rice",
        label: "Rice",
        emoji: "🌾",
        growth_days: 120,
        water_need: WaterNeed::VeryHigh,
        temp_range: "22-35°C",
        seasons: &[Season::Kharif, Season::Monsoon],
        stages: &["Nursery", "Transplanting", "Tillering", "Flowering", "Harvest"],
    },
    CropProfile {
        key: "wheat",
        label: "Wheat",
        emoji: "🌾",
        growth_days: 120,
        water_need: WaterNeed::Medium,
        temp_range: "15-25°C",
        seasons: &[Season::Rabi, Season::Winter],
        stages: &["Sowing", "Crown Root", "Tillering", "Heading", "Harvest"],
    },
    CropProfile {
        key: "cotton",
        label: "Cotton",
        emoji: "🌿",
        growth_days: 160,
        water_need: WaterNeed::Medium,
        temp_range: "25-35°C",
        seasons: &[Season::Kharif, Season::Summer],
        stages: &["Germination", "Vegetative", "Squaring", "Boll Formation", "Harvest"],
    },
    CropProfile {
        key: "chili",
        label: "Chili",
        emoji: "🌶️",
        growth_days: 90,
        water_need: WaterNeed::Medium,
        temp_range: "20-30°C",
        seasons: &[Season::Summer, Season::Monsoon],
        stages: &["Seedling", "Vegetative", "Flowering", "Fruiting", "Harvest"],
    },
    CropProfile {
        key: "mango",
        label: "Mango",
        emoji: "🥭",
        growth_days: 150,
        water_need: WaterNeed::Low,
        temp_range: "24-30°C",
        seasons: &[Season::Summer],
        stages: &["Dormancy", "Flowering", "Fruit Set", "Growth", "Harvest"],
    },
    CropProfile {
        key: "banana",
        label: "Banana",
        emoji: "🍌",
        growth_days: 300,
        water_need: WaterNeed::High,
        temp_range: "20-35°C",
        seasons: &[Season::AllYear],
        stages: &["Planting", "Vegetative", "Flowering", "Bunch Development", "Harvest"],
    },
    CropProfile {
        key: "groundnut",
        label: "Groundnut",
        emoji: "🥜",
        growth_days: 110,
        water_need: WaterNeed::Medium,
        temp_range: "25-35°C",
        seasons: &[Season::Kharif, Season::Rabi],
        stages: &["Sowing", "Vegetative", "Flowering", "Pegging", "Harvest"],
    },
];

/// Look a crop up by key or label, ignoring case
pub fn find_crop(name: &str) -> Option<&'static CropProfile> {
    let name = name.trim();
    CROP_DATABASE
        .iter()
        .find(|crop| crop.key.eq_ignore_ascii_case(name) || crop.label.eq_ignore_ascii_case(name))
}

/// Crops worth sowing in `month`, in database order, each listed once
pub fn season_recommendations(month: u32) -> Vec<&'static CropProfile> {
    let active = Season::active_in(month);
    CROP_DATABASE
        .iter()
        .filter(|crop| crop.suits_any(&active))
        .collect()
}

pub fn month_name(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    NAMES.get(index).copied()
}

impl CropProfile {
    pub fn is_year_round(&self) -> bool {
        self.seasons.contains(&Season::AllYear)
    }

    fn suits_any(&self, active: &[Season]) -> bool {
        self.is_year_round() || active.iter().any(|season| self.seasons.contains(season))
    }

    pub fn harvest_date(&self, planted: NaiveDate) -> NaiveDate {
        planted + Duration::days(i64::from(self.growth_days))
    }

    /// Growth progress on `today`, clamped to 0-100
    pub fn progress(&self, planted: NaiveDate, today: NaiveDate) -> u8 {
        let elapsed = (today - planted).num_days() as f64;
        let percent = (elapsed / f64::from(self.growth_days.max(1)) * 100.0).round();
        percent.clamp(0.0, 100.0) as u8
    }

    /// Stage reached at a progress percentage
    pub fn stage_at(&self, progress: u8) -> &'static str {
        let last = self.stages.len().saturating_sub(1);
        let index = (f64::from(progress.min(100)) / 100.0 * last as f64).floor() as usize;
        self.stages.get(index.min(last)).copied().unwrap_or_default()
    }

    pub fn timeline(&self, planted: NaiveDate, today: NaiveDate) -> CropTimeline {
        let harvest_date = self.harvest_date(planted);
        let progress = self.progress(planted, today);
        CropTimeline {
            crop: self.key.to_string(),
            planting_date: planted,
            harvest_date,
            progress,
            current_stage: self.stage_at(progress).to_string(),
            days_until_harvest: (harvest_date - today).num_days(),
        }
    }
}

/// Where a planted crop stands on a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropTimeline {
    pub crop: String,
    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub progress: u8,
    pub current_stage: String,
    /// Negative once the harvest date has passed
    pub days_until_harvest: i64,
}

/// Month view shown on the calendar page
#[derive(Debug, Clone, Serialize)]
pub struct SeasonRecommendation {
    pub month: u32,
    pub month_name: &'static str,
    pub seasons: Vec<Season>,
    pub crops: Vec<&'static CropProfile>,
}

impl SeasonRecommendation {
    /// `None` unless `month` is 1-12
    pub fn for_month(month: u32) -> Option<Self> {
        Some(Self {
            month,
            month_name: month_name(month)?,
            seasons: Season::active_in(month),
            crops: season_recommendations(month),
        })
    }

    pub fn for_date(date: NaiveDate) -> Self {
        let month = date.month();
        Self {
            month,
            month_name: month_name(month).unwrap_or_default(),
            seasons: Season::active_in(month),
            crops: season_recommendations(month),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(crops: &[&CropProfile]) -> Vec<&'static str> {
        crops.iter().map(|c| c.key).collect()
    }

    #[test]
    fn test_july_is_kharif() {
        assert_eq!(Season::active_in(7), vec![Season::Kharif]);
        assert_eq!(
            keys(&season_recommendations(7)),
            vec!["rice", "cotton", "banana", "groundnut"]
        );
    }

    #[test]
    fn test_overlapping_months() {
        assert_eq!(Season::active_in(3), vec![Season::Rabi, Season::Summer]);
        assert_eq!(Season::active_in(6), vec![Season::Kharif, Season::Summer]);

        // Groundnut is both kharif and rabi but is listed once
        let june = keys(&season_recommendations(6));
        assert_eq!(
            june,
            vec!["tomato", "rice", "cotton", "chili", "mango", "banana", "groundnut"]
        );
    }

    #[test]
    fn test_december_is_rabi() {
        assert_eq!(
            keys(&season_recommendations(12)),
            vec!["wheat", "banana", "groundnut"]
        );
    }

    #[test]
    fn test_out_of_range_month() {
        assert!(Season::active_in(13).is_empty());
        assert!(SeasonRecommendation::for_month(0).is_none());
        assert!(SeasonRecommendation::for_month(13).is_none());
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
    }

    #[test]
    fn test_find_crop_by_key_or_label() {
        assert_eq!(find_crop("Rice").map(|c| c.growth_days), Some(120));
        assert_eq!(find_crop(" groundnut ").map(|c| c.key), Some("groundnut"));
        assert!(find_crop("quinoa").is_none());
    }

    #[test]
    fn test_timeline_progress_and_stage() {
        let tomato = find_crop("tomato").unwrap();
        let planted = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let timeline = tomato.timeline(planted, NaiveDate::from_ymd_opt(2024, 7, 11).unwrap());
        assert_eq!(timeline.harvest_date, NaiveDate::from_ymd_opt(2024, 8, 20).unwrap());
        assert_eq!(timeline.progress, 50);
        assert_eq!(timeline.current_stage, "Flowering");
        assert_eq!(timeline.days_until_harvest, 40);

        let before = tomato.timeline(planted, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(before.progress, 0);
        assert_eq!(before.current_stage, "Seedling");

        let after = tomato.timeline(planted, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(after.progress, 100);
        assert_eq!(after.current_stage, "Harvest");
        assert!(after.days_until_harvest < 0);
    }

    #[test]
    fn test_profile_serialization() {
        let json = serde_json::to_value(find_crop("rice").unwrap()).unwrap();
        assert_eq!(json["water_need"], "very-high");
        assert_eq!(json["seasons"], serde_json::json!(["kharif", "monsoon"]));

        let banana = serde_json::to_value(find_crop("banana").unwrap()).unwrap();
        assert_eq!(banana["seasons"], serde_json::json!(["all"]));
    }
}
