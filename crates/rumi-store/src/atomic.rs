//! C9: atomic JSON persistence (§4.9). Writes go to a sibling temp file in
//! the same directory, are fsync'd, then renamed over the destination so a
//! reader never observes a partially-written file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{StoreError, StoreResult};

pub async fn atomic_write_json<T: Serialize>(path: &Path, value: &T, what: &'static str) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize { what, source })?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
    }

    let tmp_path = sibling_tmp_path(path);
    let write_result = write_and_sync(&tmp_path, &json).await;
    if let Err(source) = write_result {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(StoreError::Write { path: path.to_path_buf(), source });
    }

    if let Err(source) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(StoreError::Write { path: path.to_path_buf(), source });
    }

    tracing::debug!(path = %path.display(), bytes = json.len(), "persisted {} atomically", what);
    Ok(())
}

async fn write_and_sync(tmp_path: &Path, json: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp_path).await?;
    file.write_all(json).await?;
    file.sync_all().await
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("tmp");
    path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()))
}

/// Reads and deserializes `path`. Corrupt or unreadable data is treated as
/// a cache miss (`None`), never an error.
pub async fn load_if_current<T, F>(path: &Path, is_current: F) -> Option<T>
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> bool,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "persisted file unreadable, treating as cache miss");
            return None;
        }
    };

    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => {
            if is_current(&value) {
                Some(value)
            } else {
                tracing::debug!(path = %path.display(), "persisted file is stale, treating as cache miss");
                None
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "persisted file corrupt, treating as cache miss");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        value: u32,
    }

    #[tokio::test]
    async fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        atomic_write_json(&path, &Sample { value: 42 }, "sample").await.unwrap();

        let loaded: Option<Sample> = load_if_current(&path, |_| true).await;
        assert_eq!(loaded, Some(Sample { value: 42 }));
    }

    #[tokio::test]
    async fn no_temp_files_left_behind_after_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        atomic_write_json(&path, &Sample { value: 1 }, "sample").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("sample.json")]);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let loaded: Option<Sample> = load_if_current(&path, |_| true).await;
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn stale_file_is_reported_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        atomic_write_json(&path, &Sample { value: 1 }, "sample").await.unwrap();

        let loaded: Option<Sample> = load_if_current(&path, |s: &Sample| s.value == 999).await;
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn missing_file_is_reported_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let loaded: Option<Sample> = load_if_current(&path, |_| true).await;
        assert_eq!(loaded, None);
    }
}
