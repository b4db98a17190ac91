//! Scan history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Overall health of a scanned plant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum HealthStatus {
    Healthy,
    Issues,
    Critical,
    #[default]
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Issues => "issues",
            HealthStatus::Critical => "critical",
            HealthStatus::Unknown => "unknown",
        }
    }

    /// Counted under "issues" on the dashboard
    pub fn needs_attention(&self) -> bool {
        matches!(self, HealthStatus::Issues | HealthStatus::Critical)
    }
}

impl From<String> for HealthStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "healthy" => HealthStatus::Healthy,
            "issues" | "unhealthy" | "diseased" | "moderate" | "mild" | "warning" => {
                HealthStatus::Issues
            }
            "critical" | "severe" => HealthStatus::Critical,
            _ => HealthStatus::Unknown,
        }
    }
}

impl From<HealthStatus> for String {
    fn from(status: HealthStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One stored analysis. Write-once: entries are only appended or removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanHistoryEntry {
    pub id: String,
    pub plant_name: String,
    pub health_status: HealthStatus,
    /// Image reference (URL or data URL) shown as the thumbnail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub full_analysis: Value,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied entry; missing fields are filled in by the store.
///
/// The id and creation time always come from the store. An `id` or
/// `created_at` sent by the client is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewScanEntry {
    pub plant_name: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub image: Option<String>,
    pub full_analysis: Value,
}

impl NewScanEntry {
    pub fn into_entry(self, id: String, now: DateTime<Utc>) -> ScanHistoryEntry {
        ScanHistoryEntry {
            id,
            plant_name: self
                .plant_name
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Unknown Plant".to_string()),
            health_status: self.health_status.unwrap_or_default(),
            image: self.image,
            full_analysis: self.full_analysis,
            created_at: now,
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanStats {
    pub total: usize,
    pub healthy: usize,
    pub issues: usize,
}

impl ScanStats {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ScanHistoryEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |mut stats, entry| {
            stats.total += 1;
            if entry.health_status == HealthStatus::Healthy {
                stats.healthy += 1;
            } else if entry.health_status.needs_attention() {
                stats.issues += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, status: HealthStatus) -> ScanHistoryEntry {
        ScanHistoryEntry {
            id: id.to_string(),
            plant_name: "Tomato".to_string(),
            health_status: status,
            image: None,
            full_analysis: Value::Null,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_health_status_parsing() {
        assert_eq!(HealthStatus::from("Healthy".to_string()), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from("diseased".to_string()), HealthStatus::Issues);
        assert_eq!(HealthStatus::from("severe".to_string()), HealthStatus::Critical);
        assert_eq!(HealthStatus::from("???".to_string()), HealthStatus::Unknown);
    }

    #[test]
    fn test_stats_counts() {
        let entries = vec![
            entry("a", HealthStatus::Healthy),
            entry("b", HealthStatus::Issues),
            entry("c", HealthStatus::Critical),
            entry("d", HealthStatus::Unknown),
        ];
        let stats = ScanStats::from_entries(&entries);
        assert_eq!(
            stats,
            ScanStats {
                total: 4,
                healthy: 1,
                issues: 2
            }
        );
    }

    #[test]
    fn test_new_entry_defaults() {
        let now = Utc::now();
        let entry = NewScanEntry::default().into_entry("scan_1".to_string(), now);
        assert_eq!(entry.id, "scan_1");
        assert_eq!(entry.plant_name, "Unknown Plant");
        assert_eq!(entry.health_status, HealthStatus::Unknown);
        assert_eq!(entry.created_at, now);
    }

    #[test]
    fn test_client_id_and_time_ignored() {
        let now = Utc::now();
        let new_entry: NewScanEntry = serde_json::from_value(serde_json::json!({
            "id": "scan_device_42",
            "created_at": "2020-01-01T00:00:00Z",
            "plant_name": "Chili"
        }))
        .unwrap();
        let entry = new_entry.into_entry("scan_7".to_string(), now);

        assert_eq!(entry.id, "scan_7");
        assert_eq!(entry.created_at, now);
        assert_eq!(entry.plant_name, "Chili");
    }
}
