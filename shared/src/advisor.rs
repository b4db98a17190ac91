//! Farming advice aggregation
//!
//! Combines current weather, an optional soil report and the forecast into a
//! scored, prioritized [`AdviceBundle`]. Pure and deterministic: identical
//! inputs always produce identical output.

use thiserror::Error;

use crate::i18n::{self, ActivityBand, Phrase};
use crate::models::{
    AdviceBundle, BestActivity, ClimateZone, FarmingAlert, ForecastDay, ScoreRating, Severity,
    SoilReport, WeatherSnapshot,
};
use crate::types::Language;

/// Score before any weather adjustment
pub const BASELINE_SCORE: i32 = 70;

/// Above this temperature (°C) watering advice kicks in
const HOT_THRESHOLD: f64 = 35.0;
/// Below this humidity (%) soil moisture advice kicks in
const DRY_HUMIDITY_THRESHOLD: f64 = 40.0;
/// Above this temperature (°C) pests are the main concern, otherwise fungi
const PEST_THRESHOLD: f64 = 25.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdviceError {
    #[error("current weather is required to compute farming advice")]
    MissingWeather,
}

/// +15 in the growing range 20-32°C, -20 below 15°C or above 40°C.
///
/// The bands leave (15, 20) and (32, 40] neutral.
pub fn temperature_adjustment(temperature: f64) -> i32 {
    if (20.0..=32.0).contains(&temperature) {
        15
    } else if temperature < 15.0 || temperature > 40.0 {
        -20
    } else {
        0
    }
}

/// +10 for 50-75% humidity, -15 below 30% or above 90%, neutral otherwise
pub fn humidity_adjustment(humidity: f64) -> i32 {
    if (50.0..=75.0).contains(&humidity) {
        10
    } else if humidity < 30.0 || humidity > 90.0 {
        -15
    } else {
        0
    }
}

pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

/// 0-100 suitability of the current weather for farm work
pub fn farming_score(temperature: f64, humidity: f64) -> u8 {
    clamp_score(BASELINE_SCORE + temperature_adjustment(temperature) + humidity_adjustment(humidity))
}

/// Percentage of forecast days with strictly positive rain
pub fn rain_probability(forecast: &[ForecastDay]) -> f64 {
    if forecast.is_empty() {
        return 0.0;
    }
    let rainy = forecast.iter().filter(|day| day.is_rainy()).count();
    rainy as f64 / forecast.len() as f64 * 100.0
}

/// Build the full advice bundle.
///
/// `current` is mandatory; a missing soil report or an empty forecast only
/// removes the parts derived from them.
pub fn compute_advice(
    current: Option<&WeatherSnapshot>,
    soil: Option<&SoilReport>,
    forecast: &[ForecastDay],
    language: Language,
) -> Result<AdviceBundle, AdviceError> {
    let current = current.ok_or(AdviceError::MissingWeather)?;
    let temp = current.temperature;
    let humidity = current.humidity;
    let raining = current.is_raining();

    let mut advice = Vec::new();
    let mut alerts = Vec::new();
    let mut tasks = Vec::new();

    // Independent triggers, evaluated in a fixed order
    if raining {
        advice.push(Phrase::PostponeIrrigation.text(language).to_string());
        alerts.push(FarmingAlert::new(
            Severity::Warning,
            Phrase::CheckWaterlogging.text(language),
        ));
    }

    if !raining && temp > HOT_THRESHOLD {
        advice.push(Phrase::IncreaseWatering.text(language).to_string());
        tasks.push(Phrase::WaterEarlyOrEvening.text(language).to_string());
    }

    if !raining && temp <= HOT_THRESHOLD && humidity < DRY_HUMIDITY_THRESHOLD {
        advice.push(Phrase::MonitorSoilMoisture.text(language).to_string());
    }

    if !raining && (25.0..=32.0).contains(&temp) {
        let text = Phrase::FertilizerWindow.text(language);
        advice.push(text.to_string());
        alerts.push(FarmingAlert::new(Severity::Success, text));
    }

    let disease_tip = if temp > PEST_THRESHOLD {
        Phrase::PestWatch
    } else {
        Phrase::FungalWatch
    };
    advice.push(disease_tip.text(language).to_string());

    if let Some(soil) = soil {
        merge_soil(soil, language, &mut advice, &mut tasks);
    }

    let score = farming_score(temp, humidity);
    let zone = ClimateZone::classify(temp, humidity);

    Ok(AdviceBundle {
        advice,
        alerts,
        tasks,
        best_activities: best_activities(current, language),
        farming_score: score,
        rain_probability: rain_probability(forecast),
        conditions_summary: i18n::conditions_summary(
            &current.condition,
            temp,
            humidity,
            current.wind_speed,
            ScoreRating::from_score(score),
            language,
        ),
        climate_zone: zone.profile(),
    })
}

/// Soil priority goes to the top of the advice; deficiencies become tasks
fn merge_soil(
    soil: &SoilReport,
    language: Language,
    advice: &mut Vec<String>,
    tasks: &mut Vec<String>,
) {
    if let Some(priority) = soil.priority_action() {
        advice.insert(0, priority.to_string());
    }

    for (nutrient, status) in soil.deficiencies() {
        tasks.push(i18n::nutrient_task(
            nutrient,
            status.level_or_default(),
            status.remedy.as_deref(),
            language,
        ));
    }
}

/// Which activity band the current weather falls into
pub fn activity_band(current: &WeatherSnapshot) -> ActivityBand {
    let temp = current.temperature;
    if current.is_raining() {
        ActivityBand::Rainy
    } else if temp > HOT_THRESHOLD {
        ActivityBand::VeryHot
    } else if temp >= 25.0 {
        ActivityBand::Warm
    } else if temp >= 15.0 {
        ActivityBand::Mild
    } else {
        ActivityBand::Cold
    }
}

fn best_activities(current: &WeatherSnapshot, language: Language) -> Vec<BestActivity> {
    i18n::activities(activity_band(current), language)
        .iter()
        .map(|(activity, window)| BestActivity {
            activity: activity.to_string(),
            window: window.to_string(),
        })
        .collect()
}
