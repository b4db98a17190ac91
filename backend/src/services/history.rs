//! Scan history store
//!
//! The local backend is authoritative for immediate reads (dashboard
//! counters, the list right after a scan). A remote REST table mirrors it on
//! a best-effort basis: mirror writes run detached, and a failing remote read
//! silently degrades to local data.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{NewScanEntry, ScanHistoryEntry, ScanStats};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::json_file;

// ============================================================================
// Remote backend
// ============================================================================

/// A remote copy of the scan history, keyed by the same entry ids
#[async_trait]
pub trait RemoteHistory: Send + Sync {
    /// Most recent entries first
    async fn list(&self, limit: usize) -> AppResult<Vec<ScanHistoryEntry>>;
    async fn insert(&self, entry: &ScanHistoryEntry) -> AppResult<()>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn clear(&self) -> AppResult<()>;
}

/// PostgREST-style table (Supabase)
pub struct RestHistory {
    http_client: Client,
    table_url: String,
    api_key: String,
}

impl RestHistory {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http_client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Filter values go through query encoding so an id cannot alter the filter
    fn delete_request(&self, id: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::DELETE)
            .query(&[("id", format!("eq.{}", id))])
    }

    async fn check(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::HistoryStore(format!(
            "Remote history returned {}: {}",
            status, body
        )))
    }
}

#[async_trait]
impl RemoteHistory for RestHistory {
    async fn list(&self, limit: usize) -> AppResult<Vec<ScanHistoryEntry>> {
        let limit = limit.to_string();
        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "*"),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::HistoryStore))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::HistoryStore(format!("Failed to parse remote history: {}", e)))
    }

    async fn insert(&self, entry: &ScanHistoryEntry) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::HistoryStore))?;

        Self::check(response).await.map(|_| ())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let response = self
            .delete_request(id)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::HistoryStore))?;

        Self::check(response).await.map(|_| ())
    }

    async fn clear(&self) -> AppResult<()> {
        // PostgREST refuses an unfiltered DELETE
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", "not.is.null")])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(e, AppError::HistoryStore))?;

        Self::check(response).await.map(|_| ())
    }
}

// ============================================================================
// Local backend
// ============================================================================

/// Everything the local backend persists
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
struct LocalState {
    /// Oldest first; reversed on read
    entries: Vec<ScanHistoryEntry>,
    /// Ids removed locally, hidden while the remote may still return them.
    /// Dropped once the remote confirms the delete or stops listing the id.
    removed: HashSet<String>,
    /// Remote entries created at or before this instant are hidden
    cleared_at: Option<DateTime<Utc>>,
}

/// In-memory history, optionally persisted to a JSON file
pub struct LocalHistory {
    state: RwLock<LocalState>,
    path: Option<PathBuf>,
}

impl LocalHistory {
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(LocalState::default()),
            path: None,
        }
    }

    /// Open the file-backed store, starting empty when the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let state = json_file::load(&path).await?;

        Ok(Self {
            state: RwLock::new(state),
            path: Some(path),
        })
    }

    async fn persist(&self, state: &LocalState) -> AppResult<()> {
        match &self.path {
            Some(path) => json_file::save(path, state).await,
            None => Ok(()),
        }
    }

    /// Entries are write-once: an id that is already stored or tombstoned
    /// is refused
    async fn insert(&self, entry: ScanHistoryEntry) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.removed.contains(&entry.id) || state.entries.iter().any(|e| e.id == entry.id) {
            return Err(AppError::HistoryStore(format!(
                "Scan {} already exists",
                entry.id
            )));
        }
        state.entries.push(entry);
        self.persist(&state).await
    }

    /// Returns whether the entry was present locally
    async fn remove(&self, id: &str, tombstone: bool) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        let existed = state.entries.len() != before;
        if tombstone {
            state.removed.insert(id.to_string());
        }
        self.persist(&state).await?;
        Ok(existed)
    }

    /// Keep only the tombstones `keep` accepts; persists only on change
    async fn prune_tombstones<F>(&self, keep: F) -> AppResult<usize>
    where
        F: Fn(&str) -> bool,
    {
        let mut state = self.state.write().await;
        let before = state.removed.len();
        state.removed.retain(|id| keep(id));
        let pruned = before - state.removed.len();
        if pruned > 0 {
            self.persist(&state).await?;
        }
        Ok(pruned)
    }

    async fn clear(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut state = self.state.write().await;
        let count = state.entries.len();
        state.entries.clear();
        state.removed.clear();
        state.cleared_at = Some(now);
        self.persist(&state).await?;
        Ok(count)
    }

    async fn snapshot(&self) -> LocalState {
        self.state.read().await.clone()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Scan history with a local backend and an optional remote mirror
pub struct ScanHistoryStore {
    local: Arc<LocalHistory>,
    remote: Option<Arc<dyn RemoteHistory>>,
    sequence: AtomicU64,
}

impl ScanHistoryStore {
    pub fn new(local: LocalHistory, remote: Option<Arc<dyn RemoteHistory>>) -> Self {
        Self {
            local: Arc::new(local),
            remote,
            sequence: AtomicU64::new(0),
        }
    }

    /// Process-unique id: sequence number, milliseconds and a random suffix
    pub fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "scan_{}_{}_{}",
            seq,
            Utc::now().timestamp_millis(),
            &random[..8]
        )
    }

    /// Store an entry locally under a fresh id and the current time, then
    /// mirror it to the remote in the background
    pub async fn append(&self, new_entry: NewScanEntry) -> AppResult<ScanHistoryEntry> {
        let entry = new_entry.into_entry(self.next_id(), Utc::now());
        self.local.insert(entry.clone()).await?;
        tracing::debug!("Stored scan {} ({})", entry.id, entry.plant_name);

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            let mirrored = entry.clone();
            tokio::spawn(async move {
                if let Err(e) = remote.insert(&mirrored).await {
                    tracing::warn!("Remote history write failed for {}: {}", mirrored.id, e);
                }
            });
        }

        Ok(entry)
    }

    /// Most recent entries first, never more than `limit`
    pub async fn list(&self, limit: usize) -> Vec<ScanHistoryEntry> {
        let local = self.local.snapshot().await;

        let remote_entries = match &self.remote {
            Some(remote) => match remote.list(limit).await {
                Ok(entries) => {
                    if entries.len() < limit && !local.removed.is_empty() {
                        self.prune_absent_tombstones(&entries).await;
                    }
                    entries
                }
                Err(e) => {
                    tracing::debug!("Remote history unavailable, using local: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        merge_entries(local, remote_entries, limit)
    }

    /// A short page is the whole remote table, so ids missing from it can no
    /// longer come back
    async fn prune_absent_tombstones(&self, remote_entries: &[ScanHistoryEntry]) {
        let listed: HashSet<&str> = remote_entries.iter().map(|e| e.id.as_str()).collect();
        match self.local.prune_tombstones(|id| listed.contains(id)).await {
            Ok(0) => {}
            Ok(pruned) => tracing::debug!("Dropped {} history tombstones", pruned),
            Err(e) => tracing::warn!("Failed to prune history tombstones: {}", e),
        }
    }

    /// Remove an entry everywhere. Returns whether it existed locally.
    pub async fn remove(&self, id: &str) -> AppResult<bool> {
        let existed = self.local.remove(id, self.remote.is_some()).await?;

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            let local = Arc::clone(&self.local);
            let id = id.to_string();
            tokio::spawn(async move {
                match remote.delete(&id).await {
                    Ok(()) => {
                        if let Err(e) = local.prune_tombstones(|removed| removed != id).await {
                            tracing::warn!("Failed to drop tombstone for {}: {}", id, e);
                        }
                    }
                    Err(e) => tracing::warn!("Remote history delete failed for {}: {}", id, e),
                }
            });
        }

        Ok(existed)
    }

    /// Remove every entry. Returns the number of local entries dropped.
    pub async fn clear(&self) -> AppResult<usize> {
        let count = self.local.clear(Utc::now()).await?;

        if let Some(remote) = &self.remote {
            let remote = Arc::clone(remote);
            tokio::spawn(async move {
                if let Err(e) = remote.clear().await {
                    tracing::warn!("Remote history clear failed: {}", e);
                }
            });
        }

        Ok(count)
    }

    /// Dashboard counters, from local data only
    pub async fn stats(&self) -> ScanStats {
        let state = self.local.state.read().await;
        ScanStats::from_entries(state.entries.iter())
    }
}

/// Union of both backends, local copies winning, deletions honored
fn merge_entries(
    local: LocalState,
    remote: Vec<ScanHistoryEntry>,
    limit: usize,
) -> Vec<ScanHistoryEntry> {
    let mut by_id: HashMap<String, ScanHistoryEntry> = HashMap::new();

    for entry in remote {
        let hidden = local.removed.contains(&entry.id)
            || local.cleared_at.is_some_and(|cleared| entry.created_at <= cleared);
        if !hidden {
            by_id.insert(entry.id.clone(), entry);
        }
    }
    for entry in local.entries {
        by_id.insert(entry.id.clone(), entry);
    }

    let mut merged: Vec<_> = by_id.into_values().collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    merged.truncate(limit);
    merged
}
