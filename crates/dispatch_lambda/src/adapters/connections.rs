//! Live connection registry operations.

use std::collections::HashSet;

use async_trait::async_trait;
use dispatch_core::records::ConnectionRecord;
use serde_json::json;

use super::StoreError;
use crate::log;

/// Largest chunk `resolve_batch` may receive; the store's bulk-read key
/// ceiling.
pub const RESOLVE_BATCH_LIMIT: usize = 100;

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Idempotent upsert keyed by connection id.
    async fn register(&self, record: &ConnectionRecord) -> Result<(), StoreError>;

    /// Removes a connection; deleting an absent record is success.
    async fn deregister(&self, connection_id: &str) -> Result<(), StoreError>;

    /// First live connection for a user, `None` on a miss.
    async fn lookup_by_user(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// Resolves one chunk of at most `RESOLVE_BATCH_LIMIT` user ids to
    /// connection ids; unknown ids are silently omitted.
    async fn resolve_batch(&self, user_ids: &[String]) -> Result<Vec<String>, StoreError>;
}

/// Resolves arbitrarily many user ids through `resolve_batch`, chunked to
/// the store ceiling.
///
/// Failed chunks are logged and skipped rather than aborting the rest. The
/// result is a duplicate-free union in first-resolved order.
pub async fn resolve_connections(store: &dyn ConnectionStore, user_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let distinct: Vec<String> = user_ids
        .iter()
        .filter(|user_id| seen.insert(user_id.as_str()))
        .cloned()
        .collect();

    let mut connection_ids = Vec::new();
    let mut resolved_set = HashSet::new();
    for chunk in distinct.chunks(RESOLVE_BATCH_LIMIT) {
        match store.resolve_batch(chunk).await {
            Ok(resolved) => {
                for connection_id in resolved {
                    if resolved_set.insert(connection_id.clone()) {
                        connection_ids.push(connection_id);
                    }
                }
            }
            Err(error) => {
                log::error(
                    "connection_registry",
                    "resolve_chunk_failed",
                    json!({
                        "chunk_size": chunk.len(),
                        "error": error.to_string(),
                    }),
                );
            }
        }
    }
    connection_ids
}

/// Best-effort removal of a connection that reported gone. Failures are
/// logged and dropped; pruning must never fail a delivery pass.
pub async fn prune_connection(store: &dyn ConnectionStore, connection_id: &str) {
    if let Err(error) = store.deregister(connection_id).await {
        log::error(
            "connection_registry",
            "prune_failed",
            json!({
                "connection_id": connection_id,
                "error": error.to_string(),
            }),
        );
    }
}
