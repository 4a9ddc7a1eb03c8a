//! `$disconnect` route: forget a closed socket.

use serde_json::{json, Value};

use crate::adapters::connections::ConnectionStore;
use crate::handlers::{event_connection_id, SocketResponse};
use crate::log;

/// Drops the connection record. The socket is already gone when this route
/// fires, so a failed delete is only worth a log line; the record gets
/// lazily pruned the next time a delivery finds it stale.
pub async fn handle_disconnect(event: Value, connections: &dyn ConnectionStore) -> SocketResponse {
    let Some(connection_id) = event_connection_id(&event) else {
        log_error("event_missing_connection_id", json!({}));
        return SocketResponse::error(400, "Missing connection context.");
    };

    match connections.deregister(connection_id).await {
        Ok(()) => {
            log_info(
                "connection_deregistered",
                json!({ "connection_id": connection_id }),
            );
        }
        Err(error) => {
            log_error(
                "connection_deregister_failed",
                json!({
                    "connection_id": connection_id,
                    "error": error.to_string(),
                }),
            );
        }
    }
    SocketResponse::ok("Disconnected successfully.")
}

fn log_info(event: &str, details: Value) {
    log::info("disconnect_handler", event, details);
}

fn log_error(event: &str, details: Value) {
    log::error("disconnect_handler", event, details);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use dispatch_core::records::ConnectionRecord;

    use super::*;
    use crate::adapters::StoreError;

    struct RecordingStore {
        deregistered: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                deregistered: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                deregistered: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn ids(&self) -> Vec<String> {
            self.deregistered.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl ConnectionStore for RecordingStore {
        async fn register(&self, _record: &ConnectionRecord) -> Result<(), StoreError> {
            Ok(())
        }

        async fn deregister(&self, connection_id: &str) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::new("simulated registry outage"));
            }
            self.deregistered
                .lock()
                .expect("poisoned mutex")
                .push(connection_id.to_string());
            Ok(())
        }

        async fn lookup_by_user(&self, _user_id: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn resolve_batch(&self, _user_ids: &[String]) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn disconnect_event(connection_id: &str) -> Value {
        json!({ "requestContext": { "connectionId": connection_id } })
    }

    #[tokio::test]
    async fn deregisters_the_closing_connection() {
        let store = RecordingStore::new();
        let response = handle_disconnect(disconnect_event("conn-1"), &store).await;

        assert_eq!(response, SocketResponse::ok("Disconnected successfully."));
        assert_eq!(store.ids(), vec!["conn-1"]);
    }

    #[tokio::test]
    async fn a_registry_outage_still_acknowledges_the_disconnect() {
        let store = RecordingStore::failing();
        let response = handle_disconnect(disconnect_event("conn-2"), &store).await;
        assert_eq!(response, SocketResponse::ok("Disconnected successfully."));
    }

    #[tokio::test]
    async fn an_event_without_a_connection_id_is_a_client_error() {
        let store = RecordingStore::new();
        let response = handle_disconnect(json!({}), &store).await;
        assert_eq!(
            response,
            SocketResponse::error(400, "Missing connection context.")
        );
    }
}
