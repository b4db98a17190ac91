//! CropMagix - Backend Server
//!
//! Farming assistant for smallholder farmers: plant health scans, soil
//! analysis, weather-aware farming advice and a talking-plant chat.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use external::{CerebrasClient, DeepgramClient, GeminiClient, WeatherClient};
use services::{ChatHistoryStore, LocalHistory, RemoteHistory, RestHistory, ScanHistoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: WeatherClient,
    pub vision: GeminiClient,
    pub chat: CerebrasClient,
    pub speech: DeepgramClient,
    pub history: Arc<ScanHistoryStore>,
    pub chat_history: Arc<ChatHistoryStore>,
}

impl AppState {
    /// Build every provider client from configuration
    pub fn new(config: Config, history: ScanHistoryStore, chat_history: ChatHistoryStore) -> Self {
        let timeout = Duration::from_secs(config.server.request_timeout_secs);

        let weather = WeatherClient::with_base_url(
            config.weather.api_key.clone(),
            config.weather.api_endpoint.clone(),
            timeout,
        );
        let vision = GeminiClient::new(
            config.vision.api_endpoint.clone(),
            config.vision.api_key.clone(),
            config.vision.model.clone(),
            timeout,
        );
        let chat = CerebrasClient::new(
            config.chat.api_endpoint.clone(),
            config.chat.api_key.clone(),
            config.chat.model.clone(),
            timeout,
        );
        let speech = DeepgramClient::new(
            config.speech.api_endpoint.clone(),
            config.speech.api_key.clone(),
            config.speech.stt_model.clone(),
            config.speech.tts_voice.clone(),
            timeout,
        );

        Self {
            config: Arc::new(config),
            weather,
            vision,
            chat,
            speech,
            history: Arc::new(history),
            chat_history: Arc::new(chat_history),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cropmagix_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting CropMagix Server");
    tracing::info!("Environment: {}", config.environment);

    if config.weather.api_key.is_empty() {
        tracing::warn!("Weather API key not configured; weather endpoints will fail");
    }
    if config.speech.api_key.is_empty() {
        tracing::warn!("Deepgram API key not configured; speech endpoints are disabled");
    }

    // Open scan history
    let local = match &config.history.local_path {
        Some(path) => {
            tracing::info!("Scan history file: {}", path);
            LocalHistory::open(path.as_str()).await?
        }
        None => {
            tracing::info!("Scan history kept in memory only");
            LocalHistory::in_memory()
        }
    };
    let remote = config.history.remote().map(|(url, key)| {
        tracing::info!("Mirroring scan history to {}", url);
        Arc::new(RestHistory::new(
            url,
            key,
            &config.history.remote_table,
            Duration::from_secs(config.server.request_timeout_secs),
        )) as Arc<dyn RemoteHistory>
    });
    let history = ScanHistoryStore::new(local, remote);

    // Open chat transcripts
    let max_messages = config.chat_history.max_messages;
    let chat_history = match &config.chat_history.local_path {
        Some(path) => {
            tracing::info!("Chat history file: {}", path);
            ChatHistoryStore::open(path.as_str(), max_messages).await?
        }
        None => ChatHistoryStore::in_memory(max_messages),
    };

    // Create application state
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(config, history, chat_history);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
