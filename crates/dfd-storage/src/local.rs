//! Local filesystem result store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dfd_models::{AnalysisResult, ResultId};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::{decode_record, encode_record, record_key, ResultStore};

/// Writes each record to `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct LocalResultStore {
    root: PathBuf,
}

impl LocalResultStore {
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, id: &ResultId) -> PathBuf {
        self.root.join(record_key(id))
    }
}

#[async_trait]
impl ResultStore for LocalResultStore {
    async fn persist(&self, result: &AnalysisResult) -> StorageResult<ResultId> {
        let id = ResultId::new();
        let path = self.record_path(&id);
        let bytes = encode_record(result)?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::write_failed(format!(
                "Failed to create results directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        // create_new: never replace an existing record
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    StorageError::AlreadyExists(path.display().to_string())
                }
                _ => StorageError::write_failed(format!("{}: {}", path.display(), e)),
            })?;

        file.write_all(&bytes)
            .await
            .map_err(|e| StorageError::write_failed(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| StorageError::write_failed(format!("{}: {}", path.display(), e)))?;

        info!(result_id = %id, path = %path.display(), "Analysis result persisted");
        Ok(id)
    }

    async fn load(&self, id: &ResultId) -> StorageResult<AnalysisResult> {
        let path = self.record_path(id);
        debug!(result_id = %id, path = %path.display(), "Loading analysis result");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(id.as_str()));
            }
            Err(e) => return Err(e.into()),
        };
        decode_record(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfd_models::{AnalysisVerdict, ModelInfo};

    fn sample_result() -> AnalysisResult {
        let verdict = AnalysisVerdict::from_confidence(0.42, vec![]);
        AnalysisResult::new(&verdict, vec![], vec![], 1.25, ModelInfo::default())
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalResultStore::new(dir.path().join("results"));
        let result = sample_result();

        let id = store.persist(&result).await.unwrap();
        assert!(store.record_path(&id).exists());

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded, result);
    }

    #[tokio::test]
    async fn test_each_persist_is_a_new_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalResultStore::new(dir.path());
        let result = sample_result();

        let first = store.persist(&result).await.unwrap();
        let second = store.persist(&result).await.unwrap();
        assert_ne!(first, second);

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2);
    }

    #[tokio::test]
    async fn test_record_uses_persisted_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalResultStore::new(dir.path());
        let id = store.persist(&sample_result()).await.unwrap();

        let raw = std::fs::read_to_string(store.record_path(&id)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["isDeepfake"], false);
        assert_eq!(value["modelUsed"]["type"], "cnn");
        assert!(raw.contains('\n'), "record should be pretty-printed");
    }

    #[tokio::test]
    async fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalResultStore::new(dir.path());
        let err = store.load(&ResultId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unwritable_root() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let store = LocalResultStore::new(blocker.join("results"));
        let err = store.persist(&sample_result()).await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
    }
}
