//! HTTP handlers for the weather and combined soil/weather endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{
    coordinates_or_default, parse_coordinate, require_coordinates, ImagePayload, Language,
};

use crate::error::{AppError, AppResult};
use crate::services::farming::{FarmingService, SoilWeatherResponse, WeatherOutlookResponse};
use crate::AppState;

fn farming_service(state: &AppState) -> FarmingService {
    FarmingService::new(
        Arc::new(state.weather.clone()),
        Arc::new(state.vision.clone()),
        state.config.weather.forecast_days,
    )
}

/// Query parameters for the weather outlook. Coordinates stay strings so a
/// malformed value is reported as missing rather than as a parse failure.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// Alias for `lon`
    pub lng: Option<String>,
    pub language: Option<String>,
}

/// Current weather, forecast and farming advice for a location
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<WeatherOutlookResponse>> {
    let lat = parse_coordinate(query.lat.as_deref());
    let lon = parse_coordinate(query.lon.as_deref().or(query.lng.as_deref()));
    let (lat, lon) =
        require_coordinates(lat, lon).map_err(|msg| AppError::MissingInput(msg.to_string()))?;
    let language = Language::from_optional(query.language.as_deref());

    let outlook = farming_service(&state)
        .outlook(lat, lon, None, language)
        .await
        .map_err(|e| e.with_label("Weather fetch failed"))?;
    Ok(Json(outlook.into()))
}

/// Request body for the combined soil/weather endpoint
#[derive(Debug, Deserialize)]
pub struct SoilWeatherRequest {
    pub image_base64: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub language: Option<String>,
}

/// Soil analysis (when an image is supplied) merged with weather advice
pub async fn soil_weather(
    State(state): State<AppState>,
    Json(input): Json<SoilWeatherRequest>,
) -> AppResult<Json<SoilWeatherResponse>> {
    let defaults = (
        state.config.weather.default_latitude,
        state.config.weather.default_longitude,
    );
    let (lat, lon) = coordinates_or_default(input.latitude, input.longitude, defaults);
    let language = Language::from_optional(input.language.as_deref());
    let image = input
        .image_base64
        .as_deref()
        .and_then(ImagePayload::from_base64_input);

    let outlook = farming_service(&state)
        .outlook(lat, lon, image.as_ref(), language)
        .await
        .map_err(|e| e.with_label("Analysis failed"))?;
    Ok(Json(outlook.into()))
}
