//! API Gateway Management API push channel.

use async_trait::async_trait;
use aws_sdk_apigatewaymanagement::primitives::Blob;
use aws_sdk_apigatewaymanagement::Client;

use super::push::{PushChannel, SendError};

/// Pushes payloads to WebSocket clients through the gateway's management
/// endpoint. A 410 from the gateway means the socket closed without a
/// clean `$disconnect`, reported as `SendError::Gone`.
pub struct ApiGatewayPush {
    client: Client,
}

impl ApiGatewayPush {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushChannel for ApiGatewayPush {
    async fn send(&self, connection_id: &str, payload: &[u8]) -> Result<(), SendError> {
        self.client
            .post_to_connection()
            .connection_id(connection_id)
            .data(Blob::new(payload))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| {
                let service_error = error.into_service_error();
                if service_error.is_gone_exception() {
                    SendError::Gone
                } else {
                    SendError::Failed(service_error.to_string())
                }
            })
    }
}
