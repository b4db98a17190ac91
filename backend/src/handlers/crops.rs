//! Crop calendar handlers

use axum::{
    extract::{Path, Query},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{find_crop, CropProfile, CropTimeline, SeasonRecommendation, CROP_DATABASE};

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// 1-12; the current month when absent
    pub month: Option<String>,
}

/// Every crop profile the calendar knows
pub async fn list_crops() -> Json<&'static [CropProfile]> {
    Json(CROP_DATABASE.as_slice())
}

/// Crops that suit the sowing seasons of a month
pub async fn crop_recommendations(
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<SeasonRecommendation>> {
    let recommendation = match query.month.as_deref().map(str::trim) {
        None | Some("") => SeasonRecommendation::for_date(Utc::now().date_naive()),
        Some(raw) => raw
            .parse()
            .ok()
            .and_then(SeasonRecommendation::for_month)
            .ok_or_else(|| AppError::Validation("Month must be between 1 and 12".to_string()))?,
    };
    Ok(Json(recommendation))
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// Planting date, `YYYY-MM-DD`
    pub planted: Option<String>,
}

/// Harvest date, progress and current stage of a planted crop
pub async fn crop_timeline(
    Path(crop): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> AppResult<Json<CropTimeline>> {
    let profile = find_crop(&crop)
        .ok_or_else(|| AppError::Validation(format!("Unknown crop: {}", crop)))?;
    let planted = query
        .planted
        .as_deref()
        .ok_or_else(|| AppError::MissingInput("Planting date required".to_string()))
        .and_then(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::Validation("Planting date must be YYYY-MM-DD".to_string())
            })
        })?;

    Ok(Json(profile.timeline(planted, Utc::now().date_naive())))
}
