//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions and forecasts.
//! Provider units are normalized here: wind m/s -> km/h, visibility m -> km,
//! 3-hour forecast slots -> one [`ForecastDay`] per local calendar day.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{ForecastDay, WeatherSnapshot};

use crate::error::{AppError, AppResult};

/// m/s -> km/h
const MPS_TO_KMH: f64 = 3.6;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    #[serde(default)]
    weather: Vec<OWMWeather>,
    main: OWMMain,
    visibility: Option<f64>,
    #[serde(default)]
    wind: OWMWind,
    rain: Option<OWMRain>,
    dt: i64,
    sys: Option<OWMSys>,
    #[serde(default)]
    timezone: i32,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    #[serde(default)]
    pressure: f64,
    #[serde(default)]
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OWMWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: Option<OWMCity>,
    #[serde(default)]
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    #[serde(default)]
    wind: OWMWind,
    #[serde(default)]
    pop: f64,
    rain: Option<OWMRain>,
}

impl WeatherClient {
    /// Create a new WeatherClient against the given API base URL
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current(&self, latitude: f64, longitude: f64) -> AppResult<WeatherSnapshot> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        let data: OWMCurrentResponse = self.fetch(&url).await?;
        Ok(convert_current_response(data))
    }

    /// Fetch the daily forecast by GPS coordinates, at most `days` entries
    pub async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> AppResult<Vec<ForecastDay>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        let data: OWMForecastResponse = self.fetch(&url).await?;
        Ok(group_forecast(data, days))
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::WeatherProvider))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WeatherProvider(format!(
                "Weather API returned {}: {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                AppError::WeatherProvider(format!("Failed to parse weather response: {}", e))
            })
    }
}

fn offset_for(timezone_secs: i32) -> FixedOffset {
    FixedOffset::east_opt(timezone_secs).unwrap_or_else(|| Utc.fix())
}

fn local_time(ts: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.timestamp_opt(ts, 0).single()
}

/// Most recent rain window: last hour, else last three hours, else none
fn rain_amount(rain: Option<&OWMRain>) -> f64 {
    rain.and_then(|r| r.one_hour.or(r.three_hour)).unwrap_or(0.0)
}

fn convert_current_response(data: OWMCurrentResponse) -> WeatherSnapshot {
    let offset = offset_for(data.timezone);
    let clock = |ts: Option<i64>| {
        ts.and_then(|ts| local_time(ts, offset))
            .map(|t| t.format("%H:%M").to_string())
    };
    let (condition, description) = data
        .weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_default();

    WeatherSnapshot {
        temperature: data.main.temp,
        feels_like: data.main.feels_like.unwrap_or(data.main.temp),
        humidity: data.main.humidity,
        wind_speed: data.wind.speed * MPS_TO_KMH,
        pressure: data.main.pressure,
        visibility: data.visibility.unwrap_or(0.0) / 1000.0,
        condition,
        description,
        location: data.name,
        sunrise: clock(data.sys.as_ref().and_then(|s| s.sunrise)),
        sunset: clock(data.sys.as_ref().and_then(|s| s.sunset)),
        rain_total: rain_amount(data.rain.as_ref()),
        timestamp: Utc.timestamp_opt(data.dt, 0).single().unwrap_or_else(Utc::now),
    }
}

/// Per-day accumulator for forecast slots
#[derive(Default)]
struct DayBucket {
    temps: Vec<f64>,
    humidity: Vec<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    wind_max: f64,
    rain: f64,
    pop_max: f64,
    conditions: BTreeMap<String, usize>,
    weekday: String,
}

fn group_forecast(data: OWMForecastResponse, days: usize) -> Vec<ForecastDay> {
    let offset = offset_for(data.city.map(|c| c.timezone).unwrap_or(0));
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for item in data.list {
        let Some(local) = local_time(item.dt, offset) else {
            continue;
        };
        let bucket = buckets.entry(local.date_naive()).or_default();

        bucket.weekday = local.format("%a").to_string();
        bucket.temps.push(item.main.temp);
        bucket.humidity.push(item.main.humidity);
        let slot_min = item.main.temp_min.unwrap_or(item.main.temp);
        let slot_max = item.main.temp_max.unwrap_or(item.main.temp);
        bucket.temp_min = Some(bucket.temp_min.map_or(slot_min, |m| m.min(slot_min)));
        bucket.temp_max = Some(bucket.temp_max.map_or(slot_max, |m| m.max(slot_max)));
        bucket.wind_max = bucket.wind_max.max(item.wind.speed * MPS_TO_KMH);
        bucket.rain += item
            .rain
            .as_ref()
            .and_then(|r| r.three_hour.or(r.one_hour))
            .unwrap_or(0.0);
        bucket.pop_max = bucket.pop_max.max(item.pop * 100.0);
        if let Some(w) = item.weather.first() {
            *bucket.conditions.entry(w.main.clone()).or_default() += 1;
        }
    }

    buckets
        .into_iter()
        .take(days)
        .map(|(date, bucket)| {
            // Ties resolve to the alphabetically first condition
            let condition = bucket
                .conditions
                .iter()
                .fold(None::<(&String, usize)>, |best, (name, &count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((name, count)),
                })
                .map(|(name, _)| name.clone())
                .unwrap_or_default();

            ForecastDay {
                date,
                day: bucket.weekday,
                temp: mean(&bucket.temps),
                temp_min: bucket.temp_min.unwrap_or_default(),
                temp_max: bucket.temp_max.unwrap_or_default(),
                humidity: mean(&bucket.humidity),
                wind_speed: bucket.wind_max,
                condition,
                rain_total: bucket.rain,
                precipitation_probability: bucket.pop_max,
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast_fixture() -> OWMForecastResponse {
        serde_json::from_value(serde_json::json!({
            "city": { "name": "Hyderabad", "timezone": 19800 },
            "list": [
                { "dt": 1_700_000_000, "main": { "temp": 24.0, "temp_min": 23.0, "temp_max": 25.0, "humidity": 60.0 },
                  "weather": [{ "main": "Clouds", "description": "few clouds" }],
                  "wind": { "speed": 2.0 }, "pop": 0.1 },
                { "dt": 1_700_010_800, "main": { "temp": 28.0, "temp_min": 27.0, "temp_max": 29.0, "humidity": 50.0 },
                  "weather": [{ "main": "Rain", "description": "light rain" }],
                  "wind": { "speed": 5.0 }, "pop": 0.6, "rain": { "3h": 1.5 } },
                { "dt": 1_700_100_000, "main": { "temp": 30.0, "humidity": 40.0 },
                  "weather": [{ "main": "Clear", "description": "clear sky" }],
                  "wind": { "speed": 1.0 }, "pop": 0.0 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_forecast_grouped_by_local_day() {
        let days = group_forecast(forecast_fixture(), 5);
        assert_eq!(days.len(), 2);
        assert!(days[0].date < days[1].date);

        let first = &days[0];
        assert_eq!(first.temp, 26.0);
        assert_eq!(first.temp_min, 23.0);
        assert_eq!(first.temp_max, 29.0);
        assert_eq!(first.rain_total, 1.5);
        assert_eq!(first.precipitation_probability, 60.0);
        assert!((first.wind_speed - 18.0).abs() < 1e-9);
        assert!(first.is_rainy());

        assert!(!days[1].is_rainy());
        assert_eq!(days[1].condition, "Clear");
    }

    #[test]
    fn test_forecast_truncated_to_requested_days() {
        assert_eq!(group_forecast(forecast_fixture(), 1).len(), 1);
        assert!(group_forecast(forecast_fixture(), 0).is_empty());
    }

    #[test]
    fn test_current_conversion_units() {
        let data: OWMCurrentResponse = serde_json::from_value(serde_json::json!({
            "weather": [{ "main": "Rain", "description": "moderate rain" }],
            "main": { "temp": 22.5, "feels_like": 23.0, "pressure": 1008, "humidity": 88 },
            "visibility": 6000,
            "wind": { "speed": 10.0 },
            "rain": { "3h": 4.0 },
            "dt": 1_700_000_000,
            "sys": { "sunrise": 1_699_990_000, "sunset": 1_700_030_000 },
            "timezone": 0,
            "name": "Pune"
        }))
        .unwrap();

        let snapshot = convert_current_response(data);
        assert_eq!(snapshot.wind_speed, 36.0);
        assert_eq!(snapshot.visibility, 6.0);
        assert_eq!(snapshot.rain_total, 4.0);
        assert_eq!(snapshot.location, "Pune");
        assert!(snapshot.is_raining());
        assert!(snapshot.sunrise.is_some());
    }

    #[test]
    fn test_rain_prefers_last_hour() {
        let rain = OWMRain {
            one_hour: Some(0.4),
            three_hour: Some(2.0),
        };
        assert_eq!(rain_amount(Some(&rain)), 0.4);
        assert_eq!(rain_amount(None), 0.0);
    }
}
