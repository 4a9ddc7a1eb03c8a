//! `$connect` route: admit a socket and record it in the registry.

use dispatch_core::records::ConnectionRecord;
use serde_json::{json, Value};

use crate::adapters::connections::ConnectionStore;
use crate::handlers::{event_connection_id, SocketResponse};
use crate::log;

/// Registers a freshly opened socket. The user id rides in on the connect
/// query string; sockets without one are admitted anonymously and can only
/// be reached through fan-outs that already know their connection id.
pub async fn handle_connect(event: Value, connections: &dyn ConnectionStore) -> SocketResponse {
    let Some(connection_id) = event_connection_id(&event) else {
        log_error("event_missing_connection_id", json!({}));
        return SocketResponse::error(400, "Missing connection context.");
    };

    let record = ConnectionRecord {
        connection_id: connection_id.to_string(),
        user_id: event
            .get("queryStringParameters")
            .and_then(|params| params.get("userId"))
            .and_then(Value::as_str)
            .filter(|user_id| !user_id.is_empty())
            .map(str::to_string),
        connected_at: event
            .get("requestContext")
            .and_then(|context| context.get("connectedAt"))
            .and_then(Value::as_i64)
            .unwrap_or_default(),
    };

    match connections.register(&record).await {
        Ok(()) => {
            log_info(
                "connection_registered",
                json!({
                    "connection_id": record.connection_id,
                    "user_id": record.user_id,
                }),
            );
            SocketResponse::ok("Connected successfully.")
        }
        Err(error) => {
            // A non-2xx here makes the gateway refuse the socket.
            log_error(
                "connection_register_failed",
                json!({
                    "connection_id": record.connection_id,
                    "error": error.to_string(),
                }),
            );
            SocketResponse::error(500, "Failed to connect.")
        }
    }
}

fn log_info(event: &str, details: Value) {
    log::info("connect_handler", event, details);
}

fn log_error(event: &str, details: Value) {
    log::error("connect_handler", event, details);
}
