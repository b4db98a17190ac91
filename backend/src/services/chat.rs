//! Plant chat: the farmer talks to their plant, the model answers in
//! character.

use serde::Serialize;
use shared::Language;

use crate::error::AppResult;
use crate::external::{CerebrasClient, ChatMessage};

/// Older turns beyond this are dropped from the prompt
const MAX_HISTORY_TURNS: usize = 10;

#[derive(Clone)]
pub struct ChatService {
    chat_client: CerebrasClient,
}

/// What the plant knows about itself
#[derive(Debug, Clone)]
pub struct PlantContext {
    pub plant_type: String,
    pub health_status: String,
    pub diseases: Vec<String>,
    pub language: Language,
}

/// A prior message of the conversation as the UI sends it
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// Same text as `reply`; older clients read this field
    pub response: String,
    pub language: Language,
}

impl ChatService {
    pub fn new(chat_client: CerebrasClient) -> Self {
        Self { chat_client }
    }

    pub async fn reply(
        &self,
        message: &str,
        context: &PlantContext,
        history: &[ConversationTurn],
    ) -> AppResult<ChatReply> {
        let messages = build_messages(message, context, history);
        let reply = self.chat_client.complete(&messages).await?;

        Ok(ChatReply {
            response: reply.clone(),
            reply,
            language: context.language,
        })
    }
}

fn system_prompt(context: &PlantContext) -> String {
    let diseases = if context.diseases.is_empty() {
        "none detected".to_string()
    } else {
        context.diseases.join(", ")
    };

    format!(
        "You are a {} plant talking to the farmer who grows you. \
         Your current health status is: {}. Known problems: {}. \
         Speak in first person, warmly and simply, in 2-4 short sentences. \
         Give practical care advice a smallholder farmer can act on today. \
         Always reply in {}.",
        context.plant_type,
        context.health_status,
        diseases,
        context.language.name()
    )
}

/// System prompt, the most recent prior turns, then the new message
pub fn build_messages(
    message: &str,
    context: &PlantContext,
    history: &[ConversationTurn],
) -> Vec<ChatMessage> {
    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut messages = vec![ChatMessage::system(system_prompt(context))];

    for turn in history.iter().skip(skip) {
        if turn.content.trim().is_empty() {
            continue;
        }
        let msg = match turn.role.as_str() {
            "user" | "farmer" => ChatMessage::user(turn.content.clone()),
            _ => ChatMessage::assistant(turn.content.clone()),
        };
        messages.push(msg);
    }

    messages.push(ChatMessage::user(message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PlantContext {
        PlantContext {
            plant_type: "Tomato".to_string(),
            health_status: "issues".to_string(),
            diseases: vec!["Early blight".to_string()],
            language: Language::Telugu,
        }
    }

    #[test]
    fn test_messages_order() {
        let history = vec![
            ConversationTurn {
                role: "user".to_string(),
                content: "How are you?".to_string(),
            },
            ConversationTurn {
                role: "plant".to_string(),
                content: "My leaves have spots.".to_string(),
            },
        ];
        let messages = build_messages("What should I do?", &context(), &history);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("Tomato"));
        assert!(messages[0].content.contains("Early blight"));
        assert!(messages[0].content.contains("Telugu"));
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, "What should I do?");
    }

    #[test]
    fn test_history_is_capped() {
        let history: Vec<_> = (0..30)
            .map(|i| ConversationTurn {
                role: "user".to_string(),
                content: format!("turn {}", i),
            })
            .collect();
        let messages = build_messages("latest", &context(), &history);

        assert_eq!(messages.len(), MAX_HISTORY_TURNS + 2);
        assert_eq!(messages[1].content, "turn 20");
    }
}
