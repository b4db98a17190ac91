//! JSON documents kept in local files

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

/// Read a document, starting from the default when the file does not exist
pub async fn load<T>(path: &Path) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            AppError::HistoryStore(format!("Corrupt history file {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(AppError::HistoryStore(format!(
            "Cannot read history file {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Write a document, creating parent directories as needed
pub async fn save<T>(path: &Path, value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| AppError::HistoryStore(format!("Failed to encode history: {}", e)))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::HistoryStore(e.to_string()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| AppError::HistoryStore(format!("Failed to write history: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Vec<String> = load(&dir.path().join("absent.json")).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let doc = BTreeMap::from([("rice".to_string(), 120u32)]);

        save(&path, &doc).await.unwrap();
        let loaded: BTreeMap<String, u32> = load(&path).await.unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let result: AppResult<Vec<String>> = load(&path).await;
        assert!(matches!(result, Err(AppError::HistoryStore(_))));
    }
}
