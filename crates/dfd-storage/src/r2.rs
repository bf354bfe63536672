//! R2 result store.

use async_trait::async_trait;
use dfd_models::{AnalysisResult, ResultId};
use tracing::info;

use crate::client::R2Client;
use crate::error::{StorageError, StorageResult};
use crate::store::{decode_record, encode_record, record_key, ResultStore};

const CONTENT_TYPE_JSON: &str = "application/json";

/// Default key prefix for analysis records.
pub const DEFAULT_PREFIX: &str = "results";

/// Stores each record as `<prefix>/<id>.json` in an R2 bucket.
#[derive(Clone)]
pub struct R2ResultStore {
    client: R2Client,
    prefix: String,
}

impl R2ResultStore {
    pub fn new(client: R2Client) -> Self {
        Self::with_prefix(client, DEFAULT_PREFIX)
    }

    pub fn with_prefix(client: R2Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full object key for a record.
    pub fn object_key(&self, id: &ResultId) -> String {
        object_key(&self.prefix, id)
    }
}

fn object_key(prefix: &str, id: &ResultId) -> String {
    if prefix.is_empty() {
        record_key(id)
    } else {
        format!("{}/{}", prefix, record_key(id))
    }
}

#[async_trait]
impl ResultStore for R2ResultStore {
    async fn persist(&self, result: &AnalysisResult) -> StorageResult<ResultId> {
        let id = ResultId::new();
        let key = self.object_key(&id);

        // PUT replaces silently; refuse if the key is somehow taken.
        if self.client.exists(&key).await? {
            return Err(StorageError::AlreadyExists(key));
        }

        self.client
            .upload_bytes(encode_record(result)?, &key, CONTENT_TYPE_JSON)
            .await?;

        info!(result_id = %id, bucket = self.client.bucket(), key = %key, "Analysis result persisted");
        Ok(id)
    }

    async fn load(&self, id: &ResultId) -> StorageResult<AnalysisResult> {
        let bytes = self.client.download_bytes(&self.object_key(id)).await?;
        decode_record(&bytes)
    }
}
