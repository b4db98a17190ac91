//! Health check handlers

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check endpoint handler
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "CropMagix API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Root banner
pub async fn root() -> &'static str {
    "CropMagix API"
}
