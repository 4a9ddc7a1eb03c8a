//! Inbound WebSocket envelope classification.
//!
//! Bodies arrive as raw JSON with a `type` discriminator. Classification
//! validates only the fields each kind needs and keeps the original value
//! around, because ride requests are forwarded to drivers verbatim,
//! whatever extra fields the rider attached.

use std::error::Error;
use std::fmt;

use serde_json::{json, Value};

use crate::geo::GeoPoint;

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Ride request with its pickup point and the raw envelope that gets
    /// fanned out to drivers untouched.
    RideRequest { pickup: GeoPoint, raw: Value },
    /// Directed chat payload.
    Chat { recipient_id: String, text: String },
}

/// Why a message was turned away. Each variant maps to one wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    MalformedBody,
    UnknownType,
    PickupMissing,
    PickupLatitudeMissing,
    PickupLongitudeMissing,
    InvalidCoordinates,
    RecipientMissing,
    TextMissing,
    RecipientNotConnected,
}

impl Reject {
    pub fn code(self) -> &'static str {
        match self {
            Self::MalformedBody => "invalid_request_format",
            Self::UnknownType => "unknown_message_type",
            Self::PickupMissing => "pickup_missing",
            Self::PickupLatitudeMissing => "pickup_latitude_missing",
            Self::PickupLongitudeMissing => "pickup_longitude_missing",
            Self::InvalidCoordinates => "invalid_coordinates",
            Self::RecipientMissing => "recipient_missing",
            Self::TextMissing => "text_missing",
            Self::RecipientNotConnected => "recipient_not_connected",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MalformedBody => "Invalid request format.",
            Self::UnknownType => "Unknown message type.",
            Self::PickupMissing => "Pickup location missing.",
            Self::PickupLatitudeMissing => "Pickup latitude missing.",
            Self::PickupLongitudeMissing => "Pickup longitude missing.",
            Self::InvalidCoordinates => "Invalid pickup location.",
            Self::RecipientMissing => "Recipient ID missing.",
            Self::TextMissing => "Message text missing.",
            Self::RecipientNotConnected => "Recipient is not connected.",
        }
    }

    /// Wire payload pushed back to the offending sender.
    pub fn notice(self) -> Value {
        json!({ "error": self.code(), "message": self.message() })
    }
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl Error for Reject {}

/// Parses and classifies one raw socket body.
pub fn classify(body: &str) -> Result<Inbound, Reject> {
    let raw: Value = serde_json::from_str(body).map_err(|_| Reject::MalformedBody)?;
    match raw.get("type").and_then(Value::as_str) {
        Some("ride_request") => classify_ride_request(raw),
        Some("chat_message") => classify_chat(&raw),
        _ => Err(Reject::UnknownType),
    }
}

fn classify_ride_request(raw: Value) -> Result<Inbound, Reject> {
    let pickup = raw
        .get("pickup")
        .filter(|value| value.is_object())
        .ok_or(Reject::PickupMissing)?;
    let latitude = pickup
        .get("latitude")
        .and_then(Value::as_f64)
        .ok_or(Reject::PickupLatitudeMissing)?;
    let longitude = pickup
        .get("longitude")
        .and_then(Value::as_f64)
        .ok_or(Reject::PickupLongitudeMissing)?;
    Ok(Inbound::RideRequest {
        pickup: GeoPoint {
            latitude,
            longitude,
        },
        raw,
    })
}

fn classify_chat(raw: &Value) -> Result<Inbound, Reject> {
    let recipient_id = raw
        .get("recipientId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or(Reject::RecipientMissing)?;
    let text = raw
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or(Reject::TextMissing)?;
    Ok(Inbound::Chat {
        recipient_id: recipient_id.to_string(),
        text: text.to_string(),
    })
}
