//! Record shapes shared by the handlers and the store adapters.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Last known driver position, written by the location ingestion path and
/// read here for proximity matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocationRecord {
    pub driver_id: String,
    pub geohash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_location: Option<GeoPoint>,
}

/// One live WebSocket connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub connection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Epoch milliseconds reported by the gateway at `$connect` time.
    pub connected_at: i64,
}

/// A chat message, persisted before relay. The relayed payload is this
/// record serialized as-is, so the recipient sees exactly what was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: String,
    pub sender_connection_id: String,
    pub recipient_connection_id: String,
    pub text: String,
    /// RFC 3339 UTC timestamp assigned when the message is accepted.
    pub timestamp: String,
}
