//! Lambda handlers for the three WebSocket routes.

pub mod connect;
pub mod disconnect;
pub mod message;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Route response returned to the gateway. WebSocket clients never see the
/// body; a non-2xx on `$connect` makes the gateway refuse the socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocketResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl SocketResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status_code: 200,
            body: body.to_string(),
        }
    }

    pub fn error(status_code: u16, body: &str) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }
}

/// Connection id assigned by the gateway, present on every route event.
pub fn event_connection_id(event: &Value) -> Option<&str> {
    event.get("requestContext")?.get("connectionId")?.as_str()
}

/// Raw message body; an absent body classifies as malformed downstream.
pub fn event_body(event: &Value) -> &str {
    event.get("body").and_then(Value::as_str).unwrap_or("")
}
