//! `$default` route: classify an inbound body, then dispatch a ride request
//! to nearby drivers or relay a chat message to its recipient.
//!
//! Rejected senders get a JSON notice pushed back over their own socket;
//! the route response itself stays 200 because the gateway would otherwise
//! drop the connection for a bad message.

use dispatch_core::envelope::{classify, Inbound, Reject};
use dispatch_core::geo::GeoPoint;
use dispatch_core::records::ChatMessage;
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::adapters::chat::ChatStore;
use crate::adapters::connections::{prune_connection, resolve_connections, ConnectionStore};
use crate::adapters::drivers::DriverIndex;
use crate::adapters::push::{PushChannel, SendError};
use crate::config::Config;
use crate::handlers::{event_body, event_connection_id, SocketResponse};
use crate::log;

pub async fn handle_socket_message(
    event: Value,
    config: &Config,
    drivers: &dyn DriverIndex,
    connections: &dyn ConnectionStore,
    chat: &dyn ChatStore,
    push: &dyn PushChannel,
) -> SocketResponse {
    let Some(sender) = event_connection_id(&event) else {
        log_error("event_missing_connection_id", json!({}));
        return SocketResponse::error(400, "Missing connection context.");
    };

    match classify(event_body(&event)) {
        Ok(Inbound::RideRequest { pickup, raw }) => {
            dispatch_ride_request(sender, pickup, &raw, config, drivers, connections, push).await
        }
        Ok(Inbound::Chat { recipient_id, text }) => {
            relay_chat_message(sender, &recipient_id, &text, connections, chat, push).await
        }
        Err(reject) => {
            log_info(
                "message_rejected",
                json!({ "connection_id": sender, "code": reject.code() }),
            );
            send_notice(sender, reject, connections, push).await;
            SocketResponse::ok("Message rejected.")
        }
    }
}

/// Encodes the pickup cell, reads the drivers sharing its prefix and
/// forwards the rider's envelope to each of them untouched.
async fn dispatch_ride_request(
    sender: &str,
    pickup: GeoPoint,
    raw: &Value,
    config: &Config,
    drivers: &dyn DriverIndex,
    connections: &dyn ConnectionStore,
    push: &dyn PushChannel,
) -> SocketResponse {
    let cell = match config
        .codec
        .encode(pickup.latitude, pickup.longitude, config.geohash_precision)
    {
        Ok(cell) => cell,
        Err(error) => {
            log_info(
                "message_rejected",
                json!({
                    "connection_id": sender,
                    "code": Reject::InvalidCoordinates.code(),
                    "error": error.to_string(),
                }),
            );
            send_notice(sender, Reject::InvalidCoordinates, connections, push).await;
            return SocketResponse::ok("Message rejected.");
        }
    };

    // An index outage degrades to an empty dispatch; the rider's request
    // still completes.
    let located = match drivers.query_prefix(&cell).await {
        Ok(located) => located,
        Err(error) => {
            log_error(
                "driver_query_failed",
                json!({ "cell": cell, "error": error.to_string() }),
            );
            Vec::new()
        }
    };
    let driver_ids: Vec<String> = located
        .into_iter()
        .map(|record| record.driver_id)
        .collect();
    if driver_ids.is_empty() {
        log_info(
            "no_drivers_nearby",
            json!({ "connection_id": sender, "cell": cell }),
        );
        return SocketResponse::ok("Dispatch complete.");
    }

    let connection_ids = resolve_connections(connections, &driver_ids).await;
    let payload = raw.to_string().into_bytes();
    let delivered = fan_out(
        &connection_ids,
        &payload,
        config.fanout_concurrency,
        connections,
        push,
    )
    .await;
    log_info(
        "ride_request_dispatched",
        json!({
            "connection_id": sender,
            "cell": cell,
            "drivers": driver_ids.len(),
            "connections": connection_ids.len(),
            "delivered": delivered,
        }),
    );
    SocketResponse::ok("Dispatch complete.")
}

/// Persists a chat message, then pushes the stored record to the
/// recipient's live socket.
async fn relay_chat_message(
    sender: &str,
    recipient_id: &str,
    text: &str,
    connections: &dyn ConnectionStore,
    chat: &dyn ChatStore,
    push: &dyn PushChannel,
) -> SocketResponse {
    // A registry read failure reads as a miss; the sender cannot tell the
    // difference and retries either way.
    let recipient = match connections.lookup_by_user(recipient_id).await {
        Ok(recipient) => recipient,
        Err(error) => {
            log_error(
                "recipient_lookup_failed",
                json!({ "recipient_id": recipient_id, "error": error.to_string() }),
            );
            None
        }
    };
    let Some(recipient_connection_id) = recipient else {
        log_info(
            "recipient_not_connected",
            json!({ "connection_id": sender, "recipient_id": recipient_id }),
        );
        send_notice(sender, Reject::RecipientNotConnected, connections, push).await;
        return SocketResponse::ok("Message rejected.");
    };

    let message = ChatMessage {
        message_id: Uuid::new_v4().to_string(),
        sender_connection_id: sender.to_string(),
        recipient_connection_id: recipient_connection_id.clone(),
        text: text.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    if let Err(error) = chat.put_message(&message).await {
        // Nothing reaches the recipient that was not stored first, and the
        // sender gets no failure notice.
        log_error(
            "chat_persist_failed",
            json!({
                "message_id": message.message_id,
                "error": error.to_string(),
            }),
        );
        return SocketResponse::ok("Chat relay skipped.");
    }

    let payload = match serde_json::to_vec(&message) {
        Ok(payload) => payload,
        Err(error) => {
            log_error(
                "chat_encode_failed",
                json!({
                    "message_id": message.message_id,
                    "error": error.to_string(),
                }),
            );
            return SocketResponse::ok("Chat relay skipped.");
        }
    };
    let relayed = deliver(&recipient_connection_id, &payload, connections, push).await;
    log_info(
        "chat_message_relayed",
        json!({
            "message_id": message.message_id,
            "recipient_connection_id": recipient_connection_id,
            "relayed": relayed,
        }),
    );
    SocketResponse::ok("Chat relay complete.")
}

/// Pushes one payload to every connection with at most `limit` sends in
/// flight. Returns how many deliveries succeeded.
async fn fan_out(
    connection_ids: &[String],
    payload: &[u8],
    limit: usize,
    connections: &dyn ConnectionStore,
    push: &dyn PushChannel,
) -> usize {
    stream::iter(connection_ids)
        .map(|connection_id| deliver(connection_id, payload, connections, push))
        .buffer_unordered(limit.max(1))
        .fold(0, |delivered, succeeded| async move {
            if succeeded {
                delivered + 1
            } else {
                delivered
            }
        })
        .await
}

/// One push attempt. A gone connection gets pruned from the registry;
/// either failure mode resolves to `false` so a fan-out keeps going.
async fn deliver(
    connection_id: &str,
    payload: &[u8],
    connections: &dyn ConnectionStore,
    push: &dyn PushChannel,
) -> bool {
    match push.send(connection_id, payload).await {
        Ok(()) => true,
        Err(SendError::Gone) => {
            log_info("connection_gone", json!({ "connection_id": connection_id }));
            prune_connection(connections, connection_id).await;
            false
        }
        Err(SendError::Failed(message)) => {
            log_error(
                "delivery_failed",
                json!({ "connection_id": connection_id, "error": message }),
            );
            false
        }
    }
}

/// Pushes a reject notice back to the offending sender. Failures are
/// already logged by `deliver`, and a gone sender gets pruned on the way.
async fn send_notice(
    connection_id: &str,
    reject: Reject,
    connections: &dyn ConnectionStore,
    push: &dyn PushChannel,
) {
    let payload = reject.notice().to_string().into_bytes();
    deliver(connection_id, &payload, connections, push).await;
}

fn log_info(event: &str, details: Value) {
    log::info("message_handler", event, details);
}

fn log_error(event: &str, details: Value) {
    log::error("message_handler", event, details);
}
