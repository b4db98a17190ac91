//! Plant chat handler

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{normalize_limit, ChatRecord, ChatRole, Language};
use validator::Validate;

use crate::error::AppResult;
use crate::services::chat::{ChatReply, ChatService, ConversationTurn, PlantContext};
use crate::AppState;

/// Stored turns used as context when the client sends none
const STORED_CONTEXT_TURNS: usize = 10;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "No message provided"))]
    pub message: String,
    pub plant_type: Option<String>,
    pub health_status: Option<String>,
    /// Disease names, or disease objects carrying a `name`
    #[serde(default)]
    pub diseases: Vec<Value>,
    #[serde(default)]
    pub conversation_history: Vec<Value>,
    pub language: Option<String>,
    /// When set, both sides of the exchange are added to the stored transcript
    pub session_id: Option<String>,
}

fn disease_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Accepts `{role, content}` as well as the `{sender, text}` shape the chat
/// screen stores
fn conversation_turn(value: &Value) -> Option<ConversationTurn> {
    let role = value
        .get("role")
        .or_else(|| value.get("sender"))
        .and_then(Value::as_str)
        .unwrap_or("user");
    let content = value
        .get("content")
        .or_else(|| value.get("text"))
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)?;

    Some(ConversationTurn {
        role: role.to_string(),
        content: content.to_string(),
    })
}

/// Talk to the plant
pub async fn chat(
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<ChatReply>> {
    input.validate()?;

    let context = PlantContext {
        plant_type: input
            .plant_type
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        health_status: input
            .health_status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "healthy".to_string()),
        diseases: input.diseases.iter().filter_map(disease_name).collect(),
        language: Language::from_optional(input.language.as_deref()),
    };
    let session_id = input.session_id.as_deref().filter(|s| !s.trim().is_empty());
    let mut history: Vec<_> = input
        .conversation_history
        .iter()
        .filter_map(conversation_turn)
        .collect();
    if history.is_empty() {
        if let Some(session) = session_id {
            history = state
                .chat_history
                .recent(Some(session), STORED_CONTEXT_TURNS)
                .await
                .into_iter()
                .map(|record| ConversationTurn {
                    role: record.role.as_str().to_string(),
                    content: record.content,
                })
                .collect();
        }
    }

    let service = ChatService::new(state.chat.clone());
    let reply = service
        .reply(&input.message, &context, &history)
        .await
        .map_err(|e| e.with_label("Chat failed"))?;

    if let Some(session) = session_id {
        record_exchange(&state, session, &input.message, &reply.reply).await;
    }
    Ok(Json(reply))
}

/// The reply already succeeded; a transcript write failure is only logged
async fn record_exchange(state: &AppState, session: &str, message: &str, reply: &str) {
    for (role, content) in [(ChatRole::User, message), (ChatRole::Assistant, reply)] {
        if let Err(e) = state.chat_history.append(Some(session), role, content).await {
            tracing::error!("Failed to record chat message for {}: {}", session, e);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatHistoryQuery {
    pub session_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveChatMessageRequest {
    pub session_id: Option<String>,
    #[serde(default)]
    pub role: ChatRole,
    #[serde(default)]
    #[validate(length(min = 1, message = "No message provided"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatClearResponse {
    pub success: bool,
    pub removed: usize,
}

/// Stored transcript, oldest message first
pub async fn chat_history(
    State(state): State<AppState>,
    Query(query): Query<ChatHistoryQuery>,
) -> Json<Vec<ChatRecord>> {
    let config = &state.config.chat_history;
    let limit = normalize_limit(query.limit, config.default_limit, config.max_limit);
    let session = query.session_id.as_deref().filter(|s| !s.trim().is_empty());
    Json(state.chat_history.recent(session, limit).await)
}

pub async fn save_chat_message(
    State(state): State<AppState>,
    Json(input): Json<SaveChatMessageRequest>,
) -> AppResult<(StatusCode, Json<ChatRecord>)> {
    input.validate()?;
    let record = state
        .chat_history
        .append(input.session_id.as_deref(), input.role, &input.content)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn clear_chat_history(
    State(state): State<AppState>,
    Query(query): Query<ChatHistoryQuery>,
) -> AppResult<Json<ChatClearResponse>> {
    let session = query.session_id.as_deref().filter(|s| !s.trim().is_empty());
    let removed = state.chat_history.clear(session).await?;
    Ok(Json(ChatClearResponse {
        success: true,
        removed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_message_fails_validation() {
        let request: ChatRequest = serde_json::from_value(json!({ "plant_type": "Rice" })).unwrap();
        let err = crate::error::AppError::from(request.validate().unwrap_err());
        assert_eq!(err.to_string(), "No message provided");
    }

    #[test]
    fn test_disease_shapes() {
        assert_eq!(disease_name(&json!("Rust")), Some("Rust".to_string()));
        assert_eq!(
            disease_name(&json!({"name": "Leaf curl", "severity": "high"})),
            Some("Leaf curl".to_string())
        );
        assert_eq!(disease_name(&json!(3)), None);
    }

    #[test]
    fn test_conversation_turn_shapes() {
        let turn = conversation_turn(&json!({"sender": "plant", "text": "Hi!"})).unwrap();
        assert_eq!(turn.role, "plant");
        assert_eq!(turn.content, "Hi!");
        assert!(conversation_turn(&json!({"role": "user"})).is_none());
    }
}
