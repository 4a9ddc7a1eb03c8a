//! Push delivery to connected sockets.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;

/// Why a delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The connection is no longer live; its registry entry should be
    /// pruned.
    Gone,
    /// Transient or unexpected transport failure; the connection may still
    /// be live.
    Failed(String),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gone => write!(f, "connection is gone"),
            Self::Failed(message) => write!(f, "{message}"),
        }
    }
}

impl Error for SendError {}

/// One-way payload delivery to a single connection.
#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn send(&self, connection_id: &str, payload: &[u8]) -> Result<(), SendError>;
}
