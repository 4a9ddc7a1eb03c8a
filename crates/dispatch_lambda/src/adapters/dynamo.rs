//! DynamoDB-backed store adapters.
//!
//! Table layout: drivers are keyed by `driverId` and filtered by geohash
//! prefix; connections are keyed by `connectionId` with a `user-index`
//! GSI on `userId`; chat messages are keyed by `messageId`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use dispatch_core::geo::GeoPoint;
use dispatch_core::records::{ChatMessage, ConnectionRecord, DriverLocationRecord};
use futures::stream::{self, StreamExt, TryStreamExt};

use super::chat::ChatStore;
use super::connections::{ConnectionStore, RESOLVE_BATCH_LIMIT};
use super::drivers::DriverIndex;
use super::StoreError;

/// GSI mapping users to their connections.
const USER_INDEX: &str = "user-index";

pub struct DynamoDriverIndex {
    client: Client,
    table: String,
}

impl DynamoDriverIndex {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl DriverIndex for DynamoDriverIndex {
    async fn query_prefix(&self, prefix: &str) -> Result<Vec<DriverLocationRecord>, StoreError> {
        let mut records = Vec::new();
        let mut exclusive_start_key = None;
        loop {
            let mut request = self
                .client
                .scan()
                .table_name(&self.table)
                .filter_expression("begins_with(#geohash, :prefix)")
                .expression_attribute_names("#geohash", "geohash")
                .expression_attribute_values(":prefix", AttributeValue::S(prefix.to_string()));
            if let Some(key) = exclusive_start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let output = request.send().await.map_err(|error| {
                StoreError::new(format!("failed to query driver locations: {error}"))
            })?;
            for item in output.items() {
                if let Some(record) = parse_driver_item(item) {
                    records.push(record);
                }
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }
        Ok(records)
    }
}

fn parse_driver_item(item: &HashMap<String, AttributeValue>) -> Option<DriverLocationRecord> {
    let driver_id = item.get("driverId")?.as_s().ok()?.clone();
    let geohash = item.get("geohash")?.as_s().ok()?.clone();
    let raw_location = match (number_attr(item, "latitude"), number_attr(item, "longitude")) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Some(DriverLocationRecord {
        driver_id,
        geohash,
        raw_location,
    })
}

fn number_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<f64> {
    item.get(name)?.as_n().ok()?.parse().ok()
}

pub struct DynamoConnectionStore {
    client: Client,
    table: String,
}

impl DynamoConnectionStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    async fn query_user(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .index_name(USER_INDEX)
            .key_condition_expression("userId = :user")
            .expression_attribute_values(":user", AttributeValue::S(user_id.to_string()))
            .limit(1)
            .send()
            .await
            .map_err(|error| {
                StoreError::new(format!("failed to query connections for user: {error}"))
            })?;

        Ok(output
            .items()
            .first()
            .and_then(|item| item.get("connectionId"))
            .and_then(|value| value.as_s().ok())
            .cloned())
    }
}

#[async_trait]
impl ConnectionStore for DynamoConnectionStore {
    async fn register(&self, record: &ConnectionRecord) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table)
            .item(
                "connectionId",
                AttributeValue::S(record.connection_id.clone()),
            )
            .item(
                "connectedAt",
                AttributeValue::N(record.connected_at.to_string()),
            );
        if let Some(user_id) = &record.user_id {
            request = request.item("userId", AttributeValue::S(user_id.clone()));
        }

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|error| StoreError::new(format!("failed to store connection: {error}")))
    }

    async fn deregister(&self, connection_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("connectionId", AttributeValue::S(connection_id.to_string()))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| StoreError::new(format!("failed to delete connection: {error}")))
    }

    async fn lookup_by_user(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.query_user(user_id).await
    }

    async fn resolve_batch(&self, user_ids: &[String]) -> Result<Vec<String>, StoreError> {
        // The store cannot bulk-read through the GSI, so a chunk resolves
        // as parallel index queries bounded by the same ceiling.
        let queries: Vec<_> = user_ids
            .iter()
            .map(|user_id| self.query_user(user_id))
            .collect();
        let resolved: Vec<Option<String>> = stream::iter(queries)
            .buffer_unordered(RESOLVE_BATCH_LIMIT)
            .try_collect()
            .await?;
        Ok(resolved.into_iter().flatten().collect())
    }
}

pub struct DynamoChatStore {
    client: Client,
    table: String,
}

impl DynamoChatStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ChatStore for DynamoChatStore {
    async fn put_message(&self, message: &ChatMessage) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("messageId", AttributeValue::S(message.message_id.clone()))
            .item(
                "senderConnectionId",
                AttributeValue::S(message.sender_connection_id.clone()),
            )
            .item(
                "recipientConnectionId",
                AttributeValue::S(message.recipient_connection_id.clone()),
            )
            .item("text", AttributeValue::S(message.text.clone()))
            .item("timestamp", AttributeValue::S(message.timestamp.clone()))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| StoreError::new(format!("failed to store chat message: {error}")))
    }
}
