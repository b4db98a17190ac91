//! Plant health and AR scan handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use shared::{ImagePayload, Language};

use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::services::plant::{ar_scan_usage, ar_soft_failure};
use crate::services::PlantService;
use crate::AppState;

fn plant_service(state: &AppState) -> PlantService {
    PlantService::new(state.vision.clone(), state.history.clone())
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeHealthRequest {
    pub image_base64: Option<String>,
    pub plant_type: Option<String>,
    pub language: Option<String>,
}

/// Diagnose a plant photo; the result is added to the scan history
pub async fn analyze_health(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeHealthRequest>,
) -> AppResult<Json<Value>> {
    let image = input
        .image_base64
        .as_deref()
        .and_then(ImagePayload::from_base64_input)
        .ok_or_else(|| AppError::MissingInput("No image provided".to_string()))?;
    let language = Language::from_optional(input.language.as_deref());

    let report = plant_service(&state)
        .analyze_health(&image, input.plant_type.as_deref(), language)
        .await
        .map_err(|e| e.with_label("Health analysis failed"))?;
    Ok(Json(report))
}

/// Quick identification for the AR overlay.
///
/// Failures after input validation still return a renderable payload.
pub async fn ar_scan(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match FormData::read(multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };
    let Some(image) = form.image("image") else {
        return AppError::MissingInput("No image provided".to_string()).into_response();
    };
    let language = Language::from_optional(form.text("language").as_deref());

    match plant_service(&state).ar_scan(&image, language).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!("AR scan error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ar_soft_failure(&e))).into_response()
        }
    }
}

pub async fn ar_scan_info() -> Json<Value> {
    Json(ar_scan_usage())
}
