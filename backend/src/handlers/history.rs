//! Scan history handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{normalize_limit, NewScanEntry, ScanHistoryEntry, ScanStats};

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RemovalResponse {
    pub success: bool,
    pub removed: usize,
}

/// Most recent scans first
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<ScanHistoryEntry>> {
    let config = &state.config.history;
    let limit = normalize_limit(query.limit, config.default_limit, config.max_limit);
    Json(state.history.list(limit).await)
}

pub async fn add_history(
    State(state): State<AppState>,
    Json(input): Json<NewScanEntry>,
) -> AppResult<(StatusCode, Json<ScanHistoryEntry>)> {
    let entry = state.history.append(input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RemovalResponse>> {
    let existed = state.history.remove(&id).await?;
    Ok(Json(RemovalResponse {
        success: true,
        removed: usize::from(existed),
    }))
}

pub async fn clear_history(State(state): State<AppState>) -> AppResult<Json<RemovalResponse>> {
    let removed = state.history.clear().await?;
    Ok(Json(RemovalResponse {
        success: true,
        removed,
    }))
}

/// Dashboard counters
pub async fn history_stats(State(state): State<AppState>) -> Json<ScanStats> {
    Json(state.history.stats().await)
}
