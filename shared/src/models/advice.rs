//! Farming advice output

use serde::{Deserialize, Serialize};

use super::ClimateProfile;

/// Alert severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmingAlert {
    pub severity: Severity,
    pub message: String,
}

impl FarmingAlert {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// A suggested activity and the time of day it suits best
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestActivity {
    pub activity: String,
    pub window: String,
}

/// Everything the aggregator derives for one request.
///
/// Never persisted; recomputed from the weather and soil inputs each time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdviceBundle {
    pub advice: Vec<String>,
    pub alerts: Vec<FarmingAlert>,
    pub tasks: Vec<String>,
    pub best_activities: Vec<BestActivity>,
    /// 0-100 suitability of current weather for general farm work
    pub farming_score: u8,
    /// Share of forecast days with rain, 0-100
    pub rain_probability: f64,
    pub conditions_summary: String,
    pub climate_zone: ClimateProfile,
}

impl AdviceBundle {
    pub fn has_alert(&self, severity: Severity) -> bool {
        self.alerts.iter().any(|a| a.severity == severity)
    }
}

/// Qualitative label for a farming score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreRating {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreRating::Excellent,
            60..=79 => ScoreRating::Good,
            40..=59 => ScoreRating::Fair,
            _ => ScoreRating::Poor,
        }
    }
}
