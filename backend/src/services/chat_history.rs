//! Plant chat transcripts
//!
//! Messages are kept oldest first, optionally persisted to a JSON file, and
//! capped at a configured count: the oldest messages go first.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use shared::{ChatRecord, ChatRole};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::json_file;

pub struct ChatHistoryStore {
    messages: RwLock<Vec<ChatRecord>>,
    path: Option<PathBuf>,
    max_messages: usize,
    sequence: AtomicU64,
}

impl ChatHistoryStore {
    pub fn in_memory(max_messages: usize) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            path: None,
            max_messages: max_messages.max(1),
            sequence: AtomicU64::new(0),
        }
    }

    pub async fn open(path: impl Into<PathBuf>, max_messages: usize) -> AppResult<Self> {
        let path = path.into();
        let messages = json_file::load(&path).await?;

        Ok(Self {
            messages: RwLock::new(messages),
            path: Some(path),
            max_messages: max_messages.max(1),
            sequence: AtomicU64::new(0),
        })
    }

    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "msg_{}_{}_{}",
            seq,
            Utc::now().timestamp_millis(),
            &random[..8]
        )
    }

    /// Record one message; blank content is refused
    pub async fn append(
        &self,
        session_id: Option<&str>,
        role: ChatRole,
        content: &str,
    ) -> AppResult<ChatRecord> {
        if content.trim().is_empty() {
            return Err(AppError::MissingInput("No message provided".to_string()));
        }

        let record = ChatRecord {
            id: self.next_id(),
            session_id: session_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let mut messages = self.messages.write().await;
        messages.push(record.clone());
        if messages.len() > self.max_messages {
            let excess = messages.len() - self.max_messages;
            messages.drain(..excess);
        }
        self.persist(&messages).await?;

        Ok(record)
    }

    /// The last `limit` messages, oldest first, of one session or of all
    pub async fn recent(&self, session_id: Option<&str>, limit: usize) -> Vec<ChatRecord> {
        let messages = self.messages.read().await;
        let mut selected: Vec<ChatRecord> = messages
            .iter()
            .rev()
            .filter(|m| session_id.map_or(true, |s| m.session_id.as_deref() == Some(s)))
            .take(limit)
            .cloned()
            .collect();
        selected.reverse();
        selected
    }

    /// Drop one session, or everything. Returns the number of messages removed.
    pub async fn clear(&self, session_id: Option<&str>) -> AppResult<usize> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        match session_id {
            Some(session) => messages.retain(|m| m.session_id.as_deref() != Some(session)),
            None => messages.clear(),
        }
        let removed = before - messages.len();
        if removed > 0 {
            self.persist(&messages).await?;
        }
        Ok(removed)
    }

    async fn persist(&self, messages: &[ChatRecord]) -> AppResult<()> {
        match &self.path {
            Some(path) => json_file::save(path, messages).await,
            None => Ok(()),
        }
    }
}
