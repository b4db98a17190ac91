//! Plant analysis service: health reports, soil reports and AR scans

use std::sync::Arc;

use serde_json::{json, Map, Value};
use shared::{HealthStatus, ImagePayload, Language, NewScanEntry, SoilReport};

use crate::error::{AppError, AppResult};
use crate::external::GeminiClient;
use crate::services::history::ScanHistoryStore;

/// Confidence reported when the model omits one
const DEFAULT_CONFIDENCE: u8 = 85;

#[derive(Clone)]
pub struct PlantService {
    vision_client: GeminiClient,
    history: Arc<ScanHistoryStore>,
}

impl PlantService {
    pub fn new(vision_client: GeminiClient, history: Arc<ScanHistoryStore>) -> Self {
        Self {
            vision_client,
            history,
        }
    }

    /// Analyze a plant photo and record the result in the scan history
    pub async fn analyze_health(
        &self,
        image: &ImagePayload,
        plant_type: Option<&str>,
        language: Language,
    ) -> AppResult<Value> {
        let raw = self
            .vision_client
            .analyze_plant_health(image, plant_type, language)
            .await?;
        let report = with_health_defaults(raw, plant_type);

        let entry = NewScanEntry {
            plant_name: report["plant_type"].as_str().map(str::to_string),
            health_status: report["health_status"]
                .as_str()
                .map(|s| HealthStatus::from(s.to_string())),
            full_analysis: report.clone(),
            ..Default::default()
        };
        // The analysis itself succeeded; a local store failure is only logged
        if let Err(e) = self.history.append(entry).await {
            tracing::error!("Failed to record scan history: {}", e);
        }

        Ok(report)
    }

    pub async fn analyze_soil(
        &self,
        image: &ImagePayload,
        language: Language,
    ) -> AppResult<SoilReport> {
        self.vision_client.analyze_soil(image, language).await
    }

    pub async fn ar_scan(&self, image: &ImagePayload, language: Language) -> AppResult<Value> {
        let result = self.vision_client.analyze_for_ar(image, language).await?;
        if !result.is_object() {
            return Err(AppError::VisionModel(
                "AR analysis was not a JSON object".to_string(),
            ));
        }
        Ok(result)
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        _ => false,
    }
}

/// Fill in the fields the UI always expects; unknown fields are preserved
pub fn with_health_defaults(raw: Value, requested_type: Option<&str>) -> Value {
    let mut report = match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let plant_type = requested_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("Unknown");
    let defaults = [
        ("plant_type", json!(plant_type)),
        ("health_status", json!("unknown")),
        ("diseases", json!([])),
        ("recommendations", json!([])),
        ("confidence", json!(DEFAULT_CONFIDENCE)),
        ("summary", json!("Analysis complete.")),
    ];

    for (key, default) in defaults {
        if is_missing(report.get(key)) {
            report.insert(key.to_string(), default);
        }
    }

    Value::Object(report)
}

/// Friendly payload rendered by the AR overlay when a scan fails
pub fn ar_soft_failure(error: &AppError) -> Value {
    json!({
        "identified": false,
        "plant_name": "Scan Error",
        "emoji": "❌",
        "health_emoji": "❓",
        "quick_diagnosis": "Unable to process image",
        "instant_tip": "Please try again with a clearer image",
        "fun_fact": "🌱 There are over 400,000 plant species on Earth!",
        "confidence": 0,
        "error": error.to_string(),
        "animation": "error_shake"
    })
}

/// Usage description for `GET /api/ar-scan`
pub fn ar_scan_usage() -> Value {
    json!({
        "status": "AR Scanner API Ready",
        "endpoint": "/api/ar-scan",
        "method": "POST",
        "params": {
            "image": "File or base64 string (required)",
            "language": "en|hi|te (optional, default: en)"
        },
        "features": [
            "Instant plant identification",
            "Fun facts and superpowers",
            "Health score with emoji",
            "Quick care tips",
            "AR animation hints"
        ]
    })
}
