//! Normalized weather data models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at a coordinate, normalized from the provider
///
/// Every field has a default so partially filled JSON (for example from the
/// browser) still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherSnapshot {
    /// Air temperature in °C
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    pub pressure: f64,
    /// Visibility in km
    pub visibility: f64,
    /// Provider condition group, e.g. "Clear", "Rain", "Clouds"
    pub condition: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
    /// Rain in mm over the provider's most recent window
    pub rain_total: f64,
    pub timestamp: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn new(temperature: f64, humidity: f64, condition: impl Into<String>) -> Self {
        Self {
            temperature,
            feels_like: temperature,
            humidity,
            condition: condition.into(),
            ..Default::default()
        }
    }

    /// Whether the reported condition describes rain
    pub fn is_raining(&self) -> bool {
        self.condition.to_lowercase().contains("rain")
    }
}

/// One future day of the forecast
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Short weekday label, e.g. "Mon"
    pub day: String,
    /// Average temperature over the day in °C
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    /// Strongest wind in km/h
    pub wind_speed: f64,
    pub condition: String,
    /// Total rain over the day in mm
    pub rain_total: f64,
    /// Highest precipitation probability of the day, 0-100
    pub precipitation_probability: f64,
}

impl ForecastDay {
    /// A day counts as rainy only when some rain is actually forecast
    pub fn is_rainy(&self) -> bool {
        self.rain_total > 0.0
    }
}
