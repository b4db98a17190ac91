//! Soil photo analysis

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{Language, SoilReport};

use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::services::PlantService;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SoilAnalysisResponse {
    pub success: bool,
    pub analysis: SoilReport,
    pub timestamp: DateTime<Utc>,
}

/// Analyze an uploaded soil photo
pub async fn analyze_soil(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<SoilAnalysisResponse>> {
    let form = FormData::read(multipart).await?;
    let image = form
        .image("image")
        .ok_or_else(|| AppError::MissingInput("No image provided".to_string()))?;
    let language = Language::from_optional(form.text("language").as_deref());

    let service = PlantService::new(state.vision.clone(), state.history.clone());
    let analysis = service
        .analyze_soil(&image, language)
        .await
        .map_err(|e| e.with_label("Failed to analyze soil"))?;

    Ok(Json(SoilAnalysisResponse {
        success: true,
        analysis,
        timestamp: Utc::now(),
    }))
}
