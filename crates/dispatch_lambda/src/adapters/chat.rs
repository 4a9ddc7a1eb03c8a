//! Durable chat history.

use async_trait::async_trait;
use dispatch_core::records::ChatMessage;

use super::StoreError;

/// Write side of the chat archive. A message is persisted before any relay
/// attempt, so a stored record exists even when delivery later fails.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn put_message(&self, message: &ChatMessage) -> Result<(), StoreError>;
}
