//! Result store contract.

use async_trait::async_trait;
use dfd_models::{AnalysisResult, ResultId};

use crate::error::StorageResult;

/// Append-only store for analysis records.
///
/// Every `persist` call writes a new record under a freshly generated id and
/// never replaces an existing one, so concurrent analyses need no locking.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Write `result` under a new id and return that id.
    async fn persist(&self, result: &AnalysisResult) -> StorageResult<ResultId>;

    /// Read a record back. Missing records are `StorageError::NotFound`.
    async fn load(&self, id: &ResultId) -> StorageResult<AnalysisResult>;
}

/// Object name of a record: `<id>.json`.
pub fn record_key(id: &ResultId) -> String {
    format!("{}.json", id)
}

/// Serialize a record as pretty-printed JSON.
pub fn encode_record(result: &AnalysisResult) -> StorageResult<Vec<u8>> {
    Ok(result.to_json_pretty()?.into_bytes())
}

pub fn decode_record(bytes: &[u8]) -> StorageResult<AnalysisResult> {
    Ok(serde_json::from_slice(bytes)?)
}
