//! Speech handlers: text-to-speech and transcription

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SpeakRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "No text provided"))]
    pub text: String,
    pub language: Option<String>,
}

/// Read text aloud; responds with MP3 audio
pub async fn speak(
    State(state): State<AppState>,
    Json(input): Json<SpeakRequest>,
) -> AppResult<Response> {
    input.validate()?;
    let language = input.language.as_deref().unwrap_or("en");

    let audio = state
        .speech
        .speak(&input.text, language)
        .await
        .map_err(|e| e.with_label("TTS failed"))?;
    let length = audio.len().to_string();

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, length),
        ],
        audio,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub transcript: String,
    pub confidence: f64,
    pub language: String,
}

/// Transcribe an uploaded voice clip
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<TranscribeResponse>> {
    let form = FormData::read(multipart).await?;
    let audio = form
        .file("audio")
        .ok_or_else(|| AppError::MissingInput("No audio file provided".to_string()))?;
    let language = form.text("language").unwrap_or_else(|| "en".to_string());
    let content_type = audio.content_type.as_deref().unwrap_or("audio/webm");

    let result = state
        .speech
        .transcribe(audio.bytes.clone(), content_type, &language)
        .await
        .map_err(|e| e.with_label("Transcription failed"))?;

    Ok(Json(TranscribeResponse {
        success: true,
        transcript: result.transcript,
        confidence: result.confidence,
        language: result.language,
    }))
}
