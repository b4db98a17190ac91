//! Farming outlook service
//!
//! Fetches current weather and the forecast concurrently, optionally analyzes
//! a soil photo alongside, and runs the advice aggregator over the result.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shared::{
    compute_advice, AdviceBundle, BestActivity, ClimateProfile, FarmingAlert, ForecastDay,
    ImagePayload, Language, SoilReport, WeatherSnapshot,
};

use crate::error::{AppError, AppResult};
use crate::external::{GeminiClient, WeatherClient};

/// Where current conditions and the daily forecast come from
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> AppResult<WeatherSnapshot>;
    async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> AppResult<Vec<ForecastDay>>;
}

/// Turns a soil photo into a report
#[async_trait]
pub trait SoilAnalyzer: Send + Sync {
    async fn soil_report(&self, image: &ImagePayload, language: Language) -> AppResult<SoilReport>;
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> AppResult<WeatherSnapshot> {
        self.get_current(latitude, longitude).await
    }

    async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: usize,
    ) -> AppResult<Vec<ForecastDay>> {
        self.get_forecast(latitude, longitude, days).await
    }
}

#[async_trait]
impl SoilAnalyzer for GeminiClient {
    async fn soil_report(&self, image: &ImagePayload, language: Language) -> AppResult<SoilReport> {
        self.analyze_soil(image, language).await
    }
}

/// Service combining weather, soil and advice
#[derive(Clone)]
pub struct FarmingService {
    weather: Arc<dyn WeatherSource>,
    soil: Arc<dyn SoilAnalyzer>,
    forecast_days: usize,
}

/// Everything gathered for one outlook request
#[derive(Debug, Clone)]
pub struct FarmingOutlook {
    pub current: WeatherSnapshot,
    pub forecast: Vec<ForecastDay>,
    pub soil: Option<SoilReport>,
    pub advice: AdviceBundle,
}

/// Response for `GET /api/weather`
#[derive(Debug, Serialize)]
pub struct WeatherOutlookResponse {
    pub current: WeatherSnapshot,
    pub forecast: Vec<ForecastDay>,
    pub rain_probability: f64,
    pub advice: Vec<String>,
    pub alerts: Vec<FarmingAlert>,
    pub tasks: Vec<String>,
    pub best_activities: Vec<BestActivity>,
    pub farming_score: u8,
    pub conditions_summary: String,
    pub climate_zone: ClimateProfile,
}

/// Current weather with the derived forecast fields attached
#[derive(Debug, Serialize)]
pub struct WeatherWithForecast {
    #[serde(flatten)]
    pub current: WeatherSnapshot,
    pub rain_probability: f64,
    pub forecast: Vec<ForecastDay>,
}

/// Response for `POST /api/soil-weather`
#[derive(Debug, Serialize)]
pub struct SoilWeatherResponse {
    pub soil: Option<SoilReport>,
    pub weather: WeatherWithForecast,
    pub farming_advice: Vec<String>,
    pub alerts: Vec<FarmingAlert>,
    pub tasks: Vec<String>,
    pub best_activities: Vec<BestActivity>,
    pub farming_score: u8,
    pub conditions_summary: String,
    pub climate_zone: ClimateProfile,
}

impl From<FarmingOutlook> for WeatherOutlookResponse {
    fn from(outlook: FarmingOutlook) -> Self {
        let advice = outlook.advice;
        Self {
            current: outlook.current,
            forecast: outlook.forecast,
            rain_probability: advice.rain_probability,
            advice: advice.advice,
            alerts: advice.alerts,
            tasks: advice.tasks,
            best_activities: advice.best_activities,
            farming_score: advice.farming_score,
            conditions_summary: advice.conditions_summary,
            climate_zone: advice.climate_zone,
        }
    }
}

impl From<FarmingOutlook> for SoilWeatherResponse {
    fn from(outlook: FarmingOutlook) -> Self {
        let advice = outlook.advice;
        Self {
            soil: outlook.soil,
            weather: WeatherWithForecast {
                current: outlook.current,
                rain_probability: advice.rain_probability,
                forecast: outlook.forecast,
            },
            farming_advice: advice.advice,
            alerts: advice.alerts,
            tasks: advice.tasks,
            best_activities: advice.best_activities,
            farming_score: advice.farming_score,
            conditions_summary: advice.conditions_summary,
            climate_zone: advice.climate_zone,
        }
    }
}

impl FarmingService {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        soil: Arc<dyn SoilAnalyzer>,
        forecast_days: usize,
    ) -> Self {
        Self {
            weather,
            soil,
            forecast_days,
        }
    }

    /// Build the outlook for a location.
    ///
    /// Current weather and soil analysis are required when requested; a
    /// forecast failure only degrades the forecast-derived fields.
    pub async fn outlook(
        &self,
        latitude: f64,
        longitude: f64,
        soil_image: Option<&ImagePayload>,
        language: Language,
    ) -> AppResult<FarmingOutlook> {
        let soil_future = async {
            match soil_image {
                Some(image) => self.soil.soil_report(image, language).await.map(Some),
                None => Ok(None),
            }
        };

        let (current, forecast, soil) = tokio::join!(
            self.weather.current_weather(latitude, longitude),
            self.weather
                .daily_forecast(latitude, longitude, self.forecast_days),
            soil_future,
        );

        let current = current?;
        let soil = soil?;
        let forecast = forecast.unwrap_or_else(|e| {
            tracing::warn!(
                "Forecast unavailable for ({}, {}), continuing without it: {}",
                latitude,
                longitude,
                e
            );
            Vec::new()
        });

        let advice = compute_advice(Some(&current), soil.as_ref(), &forecast, language)
            .map_err(|e| AppError::MissingInput(e.to_string()))?;

        Ok(FarmingOutlook {
            current,
            forecast,
            soil,
            advice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    /// Weather source answering from fixed results
    struct StubWeather {
        current: Option<WeatherSnapshot>,
        forecast: Option<Vec<ForecastDay>>,
    }

    #[async_trait]
    impl WeatherSource for StubWeather {
        async fn current_weather(&self, _lat: f64, _lon: f64) -> AppResult<WeatherSnapshot> {
            self.current
                .clone()
                .ok_or_else(|| AppError::WeatherProvider("API returned 401".to_string()))
        }

        async fn daily_forecast(
            &self,
            _lat: f64,
            _lon: f64,
            days: usize,
        ) -> AppResult<Vec<ForecastDay>> {
            let mut forecast = self
                .forecast
                .clone()
                .ok_or_else(|| AppError::WeatherProvider("API returned 503".to_string()))?;
            forecast.truncate(days);
            Ok(forecast)
        }
    }

    struct StubSoil {
        report: Option<SoilReport>,
    }

    #[async_trait]
    impl SoilAnalyzer for StubSoil {
        async fn soil_report(&self, _image: &ImagePayload, _language: Language) -> AppResult<SoilReport> {
            self.report
                .clone()
                .ok_or_else(|| AppError::VisionModel("Malformed soil analysis".to_string()))
        }
    }

    fn rainy_forecast() -> Vec<ForecastDay> {
        vec![
            ForecastDay {
                rain_total: 4.0,
                ..Default::default()
            },
            ForecastDay::default(),
        ]
    }

    fn service(weather: StubWeather, soil: StubSoil) -> FarmingService {
        FarmingService::new(Arc::new(weather), Arc::new(soil), 5)
    }

    fn image() -> ImagePayload {
        ImagePayload::from_base64_input("/9j/4AAQ").unwrap()
    }

    #[tokio::test]
    async fn test_outlook_with_all_sources() {
        let service = service(
            StubWeather {
                current: Some(WeatherSnapshot::new(28.0, 60.0, "Clear")),
                forecast: Some(rainy_forecast()),
            },
            StubSoil {
                report: Some(SoilReport {
                    action_priority: Some("Add lime".to_string()),
                    ..Default::default()
                }),
            },
        );

        let outlook = assert_ok!(
            service
                .outlook(17.4, 78.5, Some(&image()), Language::English)
                .await
        );
        assert_eq!(outlook.forecast.len(), 2);
        assert_eq!(outlook.advice.rain_probability, 50.0);
        assert_eq!(outlook.advice.advice[0], "Add lime");
    }

    #[tokio::test]
    async fn test_forecast_failure_degrades_to_empty() {
        let service = service(
            StubWeather {
                current: Some(WeatherSnapshot::new(28.0, 60.0, "Clear")),
                forecast: None,
            },
            StubSoil { report: None },
        );

        let outlook = assert_ok!(service.outlook(17.4, 78.5, None, Language::English).await);
        assert!(outlook.forecast.is_empty());
        assert_eq!(outlook.advice.rain_probability, 0.0);
        assert_eq!(outlook.advice.farming_score, 95);
    }

    #[tokio::test]
    async fn test_current_weather_failure_fails_request() {
        let service = service(
            StubWeather {
                current: None,
                forecast: Some(rainy_forecast()),
            },
            StubSoil { report: None },
        );

        let err = service
            .outlook(17.4, 78.5, None, Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::WeatherProvider(_)));
    }

    #[tokio::test]
    async fn test_soil_failure_fails_request_when_image_given() {
        let weather = || StubWeather {
            current: Some(WeatherSnapshot::new(28.0, 60.0, "Clear")),
            forecast: Some(rainy_forecast()),
        };

        let err = service(weather(), StubSoil { report: None })
            .outlook(17.4, 78.5, Some(&image()), Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VisionModel(_)));

        // Without an image the analyzer is never consulted
        let outlook = service(weather(), StubSoil { report: None })
            .outlook(17.4, 78.5, None, Language::English)
            .await
            .unwrap();
        assert!(outlook.soil.is_none());
    }

    fn outlook() -> FarmingOutlook {
        let current = WeatherSnapshot::new(28.0, 60.0, "Clear");
        let forecast = vec![
            ForecastDay {
                rain_total: 2.0,
                ..Default::default()
            },
            ForecastDay::default(),
        ];
        let advice = compute_advice(Some(&current), None, &forecast, Language::English).unwrap();
        FarmingOutlook {
            current,
            forecast,
            soil: None,
            advice,
        }
    }

    #[test]
    fn test_weather_response_carries_rain_probability() {
        let response = WeatherOutlookResponse::from(outlook());
        assert_eq!(response.rain_probability, 50.0);
        assert_eq!(response.farming_score, 95);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["forecast"].as_array().unwrap().len(), 2);
        assert!(json["advice"].is_array());
        assert!(json["climate_zone"]["zone"].is_string());
    }

    #[test]
    fn test_soil_weather_response_flattens_current() {
        let response = SoilWeatherResponse::from(outlook());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["weather"]["temperature"], 28.0);
        assert_eq!(json["weather"]["rain_probability"], 50.0);
        assert!(json["soil"].is_null());
        assert!(json["farming_advice"].is_array());
    }
}
