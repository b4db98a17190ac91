//! Gemini vision client
//!
//! Sends an inline image plus an instruction prompt to the generateContent
//! endpoint and parses the JSON document the model writes back.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{ImagePayload, Language, SoilReport};

use crate::error::{AppError, AppResult};

/// Client for the Gemini generative vision API
#[derive(Clone)]
pub struct GeminiClient {
    api_endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: String },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_endpoint: String, api_key: String, model: String, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            api_key,
            model,
            http_client,
        }
    }

    /// Structured soil analysis of a soil photo
    pub async fn analyze_soil(
        &self,
        image: &ImagePayload,
        language: Language,
    ) -> AppResult<SoilReport> {
        let value = self.generate_json(&soil_prompt(language), image).await?;
        serde_json::from_value(value)
            .map_err(|e| AppError::VisionModel(format!("Malformed soil analysis: {}", e)))
    }

    /// Disease and health assessment of a plant photo.
    ///
    /// Returned as a JSON object; the caller fills in missing fields.
    pub async fn analyze_plant_health(
        &self,
        image: &ImagePayload,
        plant_type: Option<&str>,
        language: Language,
    ) -> AppResult<Value> {
        self.generate_json(&health_prompt(plant_type, language), image)
            .await
    }

    /// Quick identification tuned for the AR overlay
    pub async fn analyze_for_ar(&self, image: &ImagePayload, language: Language) -> AppResult<Value> {
        self.generate_json(&ar_prompt(language), image).await
    }

    async fn generate_json(&self, prompt: &str, image: &ImagePayload) -> AppResult<Value> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "Vision model API key not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_endpoint, self.model, self.api_key
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::VisionModel))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VisionModel(format!(
                "Vision API returned {}: {}",
                status, body
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::VisionModel(format!("Failed to parse response: {}", e)))?;

        let text = result
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| AppError::VisionModel("Empty response from vision model".to_string()))?;

        parse_model_json(&text)
    }
}

/// Extract the JSON object from model output, tolerating code fences and
/// leading prose.
pub fn parse_model_json(text: &str) -> AppResult<Value> {
    let trimmed = text.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');

    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => {
            return Err(AppError::VisionModel(
                "Vision model did not return a JSON object".to_string(),
            ))
        }
    };

    serde_json::from_str(candidate)
        .map_err(|e| AppError::VisionModel(format!("Invalid JSON from vision model: {}", e)))
}

fn language_instruction(language: Language) -> String {
    format!(
        "Write every human-readable text value in {} ({}). Keep JSON keys in English.",
        language.name(),
        language.code()
    )
}

fn soil_prompt(language: Language) -> String {
    format!(
        r#"You are an expert soil scientist helping a smallholder farmer.
Analyze this soil photo and respond with a single JSON object:
{{
  "soil_type": string,
  "soil_classification": string,
  "texture_description": string,
  "moisture_level": string,
  "soil_health_score": {{"overall": number 0-100, "fertility": number 0-100, "structure": number 0-100}},
  "ph_assessment": {{"estimated_ph": string, "ph_range": string, "category": string, "recommendation": string}},
  "nutrient_analysis": {{
    "nitrogen"|"phosphorus"|"potassium"|"calcium"|"magnesium"|"sulfur":
      {{"level": "high"|"adequate"|"low"|"deficient", "description": string, "remedy": string}}
  }},
  "organic_matter": {{"level": string, "percentage_estimate": string, "recommendation": string}},
  "drainage_assessment": {{"quality": string, "issues": string, "recommendation": string}},
  "ideal_crops": [{{"crop": string, "suitability": string, "reason": string, "yield_potential": string}}],
  "crops_to_avoid": [{{"crop": string, "reason": string}}],
  "amendments_needed": [{{"amendment": string, "purpose": string, "application_rate": string, "application_method": string, "timing": string, "cost_estimate": string, "organic_option": string}}],
  "improvement_plan": {{"immediate": [string], "short_term": [string], "long_term": [string]}},
  "action_priority": string
}}
{}"#,
        language_instruction(language)
    )
}

fn health_prompt(plant_type: Option<&str>, language: Language) -> String {
    let hint = plant_type
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("The farmer says this plant is: {}.\n", p))
        .unwrap_or_default();

    format!(
        r#"You are an expert plant pathologist.
{}Examine this plant photo and respond with a single JSON object:
{{
  "plant_type": string,
  "health_status": "healthy"|"issues"|"critical",
  "confidence": number 0-100,
  "diseases": [{{"name": string, "severity": string, "description": string, "treatment": string}}],
  "recommendations": [string],
  "summary": string
}}
{}"#,
        hint,
        language_instruction(language)
    )
}

fn ar_prompt(language: Language) -> String {
    format!(
        r#"Identify the plant in this camera frame for an augmented reality overlay.
Respond with a single JSON object:
{{
  "identified": boolean,
  "plant_name": string,
  "scientific_name": string,
  "emoji": string,
  "health_score": number 0-100,
  "health_emoji": string,
  "quick_diagnosis": string,
  "instant_tip": string,
  "fun_fact": string,
  "superpower": string,
  "confidence": number 0-100,
  "animation": "sparkle"|"pulse"|"warning_glow"
}}
Keep every text value short enough for a phone overlay.
{}"#,
        language_instruction(language)
    )
}
