//! Configuration management for the CropMagix server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with CROPMAGIX_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Vision model used for plant and soil analysis
    pub vision: VisionConfig,

    /// Chat model configuration
    pub chat: ChatConfig,

    /// Speech-to-text / text-to-speech provider
    pub speech: SpeechConfig,

    /// Scan history storage
    pub history: HistoryConfig,

    /// Plant chat transcripts
    pub chat_history: ChatHistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Timeout applied to every outbound provider call, in seconds
    pub request_timeout_secs: u64,

    /// Largest accepted request body (camera images, audio clips)
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: String,

    /// Number of forecast days requested
    pub forecast_days: usize,

    /// Substituted when the combined endpoint receives no coordinates
    pub default_latitude: f64,
    pub default_longitude: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    pub api_endpoint: String,

    /// Empty when speech features are disabled
    pub api_key: String,

    /// Transcription model
    pub stt_model: String,

    /// Voice used for synthesis
    pub tts_voice: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// JSON file backing the local store; in-memory only when unset
    pub local_path: Option<String>,

    /// Remote REST table base URL (e.g. a Supabase project URL)
    pub remote_url: Option<String>,

    pub remote_api_key: Option<String>,

    pub remote_table: String,

    /// Page size when the caller does not ask for one
    pub default_limit: usize,

    /// Upper bound on any page size
    pub max_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatHistoryConfig {
    /// JSON file backing the transcripts; in-memory only when unset
    pub local_path: Option<String>,

    /// Oldest messages are dropped beyond this count
    pub max_messages: usize,

    pub default_limit: usize,
    pub max_limit: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CROPMAGIX_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.request_timeout_secs", 60)?
            .set_default("server.max_body_bytes", 20 * 1024 * 1024)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("weather.forecast_days", 5)?
            .set_default("weather.default_latitude", 0.0)?
            .set_default("weather.default_longitude", 0.0)?
            .set_default(
                "vision.api_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("vision.api_key", "")?
            .set_default("vision.model", "gemini-1.5-flash")?
            .set_default("chat.api_endpoint", "https://api.cerebras.ai/v1")?
            .set_default("chat.api_key", "")?
            .set_default("chat.model", "llama3.1-8b")?
            .set_default("speech.api_endpoint", "https://api.deepgram.com/v1")?
            .set_default("speech.api_key", "")?
            .set_default("speech.stt_model", "nova-2")?
            .set_default("speech.tts_voice", "aura-asteria-en")?
            .set_default("history.remote_table", "scan_history")?
            .set_default("history.default_limit", 20)?
            .set_default("history.max_limit", 100)?
            .set_default("chat_history.max_messages", 1000)?
            .set_default("chat_history.default_limit", 20)?
            .set_default("chat_history.max_limit", 200)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CROPMAGIX_ prefix)
            .add_source(
                Environment::with_prefix("CROPMAGIX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            request_timeout_secs: 60,
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

impl HistoryConfig {
    /// Remote mirroring is enabled only with both a URL and a key
    pub fn remote(&self) -> Option<(&str, &str)> {
        match (self.remote_url.as_deref(), self.remote_api_key.as_deref()) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some((url, key))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
impl Config {
    /// Configuration with no provider keys and no persistence
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            weather: WeatherConfig {
                api_endpoint: "http://127.0.0.1:9".to_string(),
                api_key: String::new(),
                forecast_days: 5,
                default_latitude: 0.0,
                default_longitude: 0.0,
            },
            vision: VisionConfig {
                api_endpoint: "http://127.0.0.1:9".to_string(),
                api_key: String::new(),
                model: "test".to_string(),
            },
            chat: ChatConfig {
                api_endpoint: "http://127.0.0.1:9".to_string(),
                api_key: String::new(),
                model: "test".to_string(),
            },
            speech: SpeechConfig {
                api_endpoint: "http://127.0.0.1:9".to_string(),
                api_key: String::new(),
                stt_model: "nova-2".to_string(),
                tts_voice: "aura-asteria-en".to_string(),
            },
            history: HistoryConfig {
                local_path: None,
                remote_url: None,
                remote_api_key: None,
                remote_table: "scan_history".to_string(),
                default_limit: 20,
                max_limit: 100,
            },
            chat_history: ChatHistoryConfig {
                local_path: None,
                max_messages: 100,
                default_limit: 20,
                max_limit: 200,
            },
        }
    }
}
