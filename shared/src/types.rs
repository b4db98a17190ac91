//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported languages for provider prompts and advice text
///
/// Unknown codes fall back to English instead of failing deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Telugu => "te",
        }
    }

    /// Human readable name, used when instructing the language models
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "hi" | "hindi" => Language::Hindi,
            "te" | "telugu" => Language::Telugu,
            _ => Language::English,
        }
    }

    /// Resolve an optional request field, defaulting to English
    pub fn from_optional(code: Option<&str>) -> Self {
        code.map(Self::from_code).unwrap_or_default()
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Language::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Base64 image ready to be forwarded to a vision model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    /// Parse a raw base64 string or a `data:` URL.
    ///
    /// Returns `None` when no image data remains after stripping the prefix.
    pub fn from_base64_input(input: &str) -> Option<Self> {
        let input = input.trim();
        let (mime_type, data) = match input.split_once(',') {
            Some((prefix, data)) => (mime_from_data_url_prefix(prefix), data),
            None => (None, input),
        };

        let data = data.trim();
        if data.is_empty() {
            return None;
        }

        Some(Self {
            mime_type: mime_type.unwrap_or(Self::DEFAULT_MIME_TYPE).to_string(),
            data: data.to_string(),
        })
    }
}

/// `data:image/png;base64` -> `image/png`
fn mime_from_data_url_prefix(prefix: &str) -> Option<&str> {
    let rest = prefix.strip_prefix("data:")?;
    let mime = rest.split(';').next()?.trim();
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("hi"), Language::Hindi);
        assert_eq!(Language::from_code("TE"), Language::Telugu);
        assert_eq!(Language::from_code("fr"), Language::English);
        assert_eq!(Language::from_optional(None), Language::English);
    }

    #[test]
    fn test_language_serde_is_lenient() {
        let lang: Language = serde_json::from_str("\"te\"").unwrap();
        assert_eq!(lang, Language::Telugu);
        let lang: Language = serde_json::from_str("\"xx\"").unwrap();
        assert_eq!(lang, Language::English);
        assert_eq!(serde_json::to_string(&Language::Hindi).unwrap(), "\"hi\"");
    }

    #[test]
    fn test_strip_data_url() {
        let payload = ImagePayload::from_base64_input("data:image/png;base64,iVBORw0KGgo").unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data, "iVBORw0KGgo");
    }

    #[test]
    fn test_raw_base64_keeps_default_mime() {
        let payload = ImagePayload::from_base64_input("/9j/4AAQSkZJRg").unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.data, "/9j/4AAQSkZJRg");
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(ImagePayload::from_base64_input("").is_none());
        assert!(ImagePayload::from_base64_input("data:image/png;base64,").is_none());
    }
}
