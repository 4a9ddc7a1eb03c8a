//! Structured JSON log lines.
//!
//! Lambda forwards stderr to CloudWatch, which indexes the JSON fields, so
//! every line carries a component, an event name, and a details object.

use serde_json::{json, Value};

pub fn info(component: &str, event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

pub fn error(component: &str, event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": component,
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
