//! Error handling for the CropMagix server
//!
//! Every error renders as `{error, detail, code}` so the UI can map it to a
//! notification.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("{0}")]
    MissingInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // External service errors
    #[error("Weather provider error: {0}")]
    WeatherProvider(String),

    #[error("Vision model error: {0}")]
    VisionModel(String),

    #[error("Chat model error: {0}")]
    ChatModel(String),

    #[error("Speech provider error: {0}")]
    SpeechProvider(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("History store error: {0}")]
    HistoryStore(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A downstream failure reported under the endpoint's own label
    #[error("{label}: {source}")]
    Labeled {
        label: &'static str,
        source: Box<AppError>,
    },

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub code: &'static str,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Labeled { source, .. } => source.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingInput(_) => "MISSING_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::WeatherProvider(_) => "WEATHER_PROVIDER_ERROR",
            AppError::VisionModel(_) => "VISION_MODEL_ERROR",
            AppError::ChatModel(_) => "CHAT_MODEL_ERROR",
            AppError::SpeechProvider(_) => "SPEECH_PROVIDER_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::HistoryStore(_) => "HISTORY_STORE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::Labeled { source, .. } => source.code(),
        }
    }

    /// Short failure label shown to the user
    fn label(&self) -> String {
        match self {
            AppError::MissingInput(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::WeatherProvider(_) => "Weather fetch failed".to_string(),
            AppError::VisionModel(_) => "Analysis failed".to_string(),
            AppError::ChatModel(_) => "Chat failed".to_string(),
            AppError::SpeechProvider(_) => "Speech processing failed".to_string(),
            AppError::Timeout(_) => "Request timed out".to_string(),
            AppError::HistoryStore(_) => "History unavailable".to_string(),
            AppError::Configuration(msg) => msg.clone(),
            AppError::InternalError(_) => "Internal server error".to_string(),
            AppError::Labeled { label, .. } => label.to_string(),
        }
    }

    /// Underlying message, omitted for plain input errors
    fn detail(&self) -> Option<String> {
        match self {
            AppError::MissingInput(_) | AppError::Configuration(_) => None,
            AppError::Validation(msg)
            | AppError::WeatherProvider(msg)
            | AppError::VisionModel(msg)
            | AppError::ChatModel(msg)
            | AppError::SpeechProvider(msg)
            | AppError::Timeout(msg)
            | AppError::HistoryStore(msg) => Some(msg.clone()),
            AppError::InternalError(e) => Some(e.to_string()),
            AppError::Labeled { source, .. } => source.detail(),
        }
    }

    /// Report a downstream failure under `label`. Input and configuration
    /// errors keep their own message.
    pub fn with_label(self, label: &'static str) -> AppError {
        match self {
            AppError::MissingInput(_) | AppError::Validation(_) | AppError::Configuration(_) => self,
            AppError::Labeled { source, .. } => AppError::Labeled { label, source },
            other => AppError::Labeled {
                label,
                source: Box::new(other),
            },
        }
    }

    /// Map a reqwest failure, keeping timeouts distinguishable
    pub fn from_reqwest(err: reqwest::Error, wrap: fn(String) -> AppError) -> AppError {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            wrap(format!("Request failed: {}", err))
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.label(),
            detail: self.detail(),
            code: self.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(self.to_response_body())).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first failing field's message, e.g. "No message provided"
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        AppError::MissingInput(message)
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart body: {}", err))
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
