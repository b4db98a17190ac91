//! Deepgram speech client
//!
//! Speech-to-text for voice questions and text-to-speech for reading replies
//! aloud.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Languages the transcription model is asked to listen for
const STT_LANGUAGES: [&str; 6] = ["en", "hi", "te", "ta", "kn", "mr"];

#[derive(Clone)]
pub struct DeepgramClient {
    api_endpoint: String,
    api_key: String,
    stt_model: String,
    tts_voice: String,
    http_client: Client,
}

/// Normalized transcription result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transcription {
    pub transcript: String,
    pub confidence: f64,
    pub language: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    results: ListenResults,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
}

/// Map a requested language to one the transcription model supports
pub fn stt_language(code: &str) -> &'static str {
    let code = code.trim().to_ascii_lowercase();
    STT_LANGUAGES
        .iter()
        .copied()
        .find(|l| *l == code)
        .unwrap_or("en")
}

impl DeepgramClient {
    pub fn new(
        api_endpoint: String,
        api_key: String,
        stt_model: String,
        tts_voice: String,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            api_key,
            stt_model,
            tts_voice,
            http_client,
        }
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "Deepgram API key not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Voice used for a reply language. Only one voice is available today.
    pub fn voice_for(&self, _language: &str) -> &str {
        &self.tts_voice
    }

    /// Transcribe an audio clip
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        content_type: &str,
        language: &str,
    ) -> AppResult<Transcription> {
        self.ensure_configured()?;

        let language = stt_language(language);
        let url = format!(
            "{}/listen?model={}&language={}&smart_format=true&punctuate=true",
            self.api_endpoint, self.stt_model, language
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", content_type)
            .body(audio)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::SpeechProvider))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SpeechProvider(format!(
                "Transcription API returned {}: {}",
                status, body
            )));
        }

        let result: ListenResponse = response
            .json()
            .await
            .map_err(|e| AppError::SpeechProvider(format!("Failed to parse response: {}", e)))?;

        Ok(first_alternative(result, language))
    }

    /// Synthesize speech, returning MP3 bytes
    pub async fn speak(&self, text: &str, language: &str) -> AppResult<Vec<u8>> {
        self.ensure_configured()?;

        let url = format!("{}/speak?model={}", self.api_endpoint, self.voice_for(language));
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&SpeakRequest { text })
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::SpeechProvider))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SpeechProvider(format!(
                "Speech API returned {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::SpeechProvider))?;
        Ok(bytes.to_vec())
    }
}

fn first_alternative(result: ListenResponse, language: &str) -> Transcription {
    let best = result
        .results
        .channels
        .into_iter()
        .next()
        .and_then(|c| c.alternatives.into_iter().next());

    Transcription {
        transcript: best.as_ref().map(|a| a.transcript.clone()).unwrap_or_default(),
        confidence: best.map(|a| a.confidence).unwrap_or(0.0),
        language: language.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stt_language_mapping() {
        assert_eq!(stt_language("te"), "te");
        assert_eq!(stt_language("KN"), "kn");
        assert_eq!(stt_language("fr"), "en");
        assert_eq!(stt_language(""), "en");
    }

    #[test]
    fn test_transcript_extraction() {
        let result: ListenResponse = serde_json::from_str(
            r#"{"results":{"channels":[{"alternatives":[{"transcript":"why are my leaves yellow","confidence":0.93}]}]}}"#,
        )
        .unwrap();
        let t = first_alternative(result, "en");
        assert_eq!(t.transcript, "why are my leaves yellow");
        assert_eq!(t.confidence, 0.93);
    }

    #[test]
    fn test_missing_transcript_defaults() {
        let result: ListenResponse = serde_json::from_str(r#"{"results":{"channels":[]}}"#).unwrap();
        let t = first_alternative(result, "hi");
        assert_eq!(t.transcript, "");
        assert_eq!(t.confidence, 0.0);
        assert_eq!(t.language, "hi");
    }
}
