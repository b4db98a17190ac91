//! External API integrations

pub mod cerebras;
pub mod deepgram;
pub mod gemini;
pub mod weather;

pub use cerebras::{CerebrasClient, ChatMessage};
pub use deepgram::DeepgramClient;
pub use gemini::GeminiClient;
pub use weather::WeatherClient;
