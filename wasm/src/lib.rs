//! WebAssembly module for CropMagix
//!
//! Provides client-side computation for:
//! - Farming score from a weather reading
//! - Rain probability over a cached forecast
//! - The full advice bundle, so pages can re-render offline
//! - Climate zone lookup
//! - Crop calendar recommendations

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Farming score (0-100) for a temperature in °C and humidity in %
#[wasm_bindgen]
pub fn calculate_farming_score(temperature: f64, humidity: f64) -> u8 {
    shared::farming_score(temperature, humidity)
}

/// Share of forecast days with rain, from a JSON array of forecast days
#[wasm_bindgen]
pub fn calculate_rain_probability(forecast_json: &str) -> Result<f64, JsValue> {
    let forecast: Vec<ForecastDay> = serde_json::from_str(forecast_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid forecast JSON: {}", e)))?;
    Ok(shared::rain_probability(&forecast))
}

/// Compute the advice bundle from JSON inputs and return it as JSON.
///
/// `soil_json` and `forecast_json` may be empty strings when unavailable.
#[wasm_bindgen]
pub fn compute_farming_advice(
    weather_json: &str,
    soil_json: &str,
    forecast_json: &str,
    language: &str,
) -> Result<String, JsValue> {
    let current: WeatherSnapshot = serde_json::from_str(weather_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid weather JSON: {}", e)))?;

    let soil = parse_optional::<SoilReport>(soil_json, "soil");
    let forecast = parse_optional::<Vec<ForecastDay>>(forecast_json, "forecast").unwrap_or_default();

    let bundle = shared::compute_advice(
        Some(&current),
        soil.as_ref(),
        &forecast,
        Language::from_code(language),
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&bundle).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Climate zone name ("tropical", "subtropical", "arid", "temperate")
#[wasm_bindgen]
pub fn classify_climate_zone(temperature: f64, humidity: f64) -> String {
    let profile = ClimateZone::classify(temperature, humidity).profile();
    serde_json::to_value(profile.zone)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Crops suiting the sowing seasons of `month` (1-12), as JSON
#[wasm_bindgen]
pub fn season_crop_recommendations(month: u32) -> Result<String, JsValue> {
    let recommendation = SeasonRecommendation::for_month(month)
        .ok_or_else(|| JsValue::from_str("Month must be between 1 and 12"))?;
    serde_json::to_string(&recommendation).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Optional inputs degrade to absent, with a console warning when malformed
fn parse_optional<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Option<T> {
    if json.trim().is_empty() || json.trim() == "null" {
        return None;
    }
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn(&format!("Ignoring malformed {} JSON: {}", what, e));
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(_message: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_farming_score() {
        assert_eq!(calculate_farming_score(28.0, 60.0), 95);
        assert_eq!(calculate_farming_score(45.0, 95.0), 35);
        assert_eq!(calculate_farming_score(17.0, 40.0), 70);
    }

    #[test]
    fn test_classify_climate_zone() {
        assert_eq!(classify_climate_zone(32.0, 80.0), "tropical");
        assert_eq!(classify_climate_zone(10.0, 80.0), "temperate");
    }

    #[test]
    fn test_compute_farming_advice_without_soil() {
        let json = compute_farming_advice(
            r#"{"temperature": 28, "humidity": 60, "condition": "Clear"}"#,
            "",
            r#"[{"rain_total": 2.0}, {"rain_total": 0}]"#,
            "en",
        )
        .unwrap();
        let bundle: AdviceBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(bundle.farming_score, 95);
        assert_eq!(bundle.rain_probability, 50.0);
    }

    #[test]
    fn test_malformed_soil_is_ignored() {
        let json = compute_farming_advice(
            r#"{"temperature": 20, "humidity": 60, "condition": "Clear"}"#,
            "{not json",
            "",
            "hi",
        )
        .unwrap();
        assert!(json.contains("farming_score"));
    }

    #[test]
    fn test_season_crop_recommendations() {
        let json = season_crop_recommendations(7).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["month_name"], "July");
        assert_eq!(value["seasons"], serde_json::json!(["kharif"]));
    }
}
