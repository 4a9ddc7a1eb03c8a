//! Store and transport seams between the handlers and AWS.
//!
//! Handlers depend on these traits only; the binaries wire in the
//! DynamoDB- and API-Gateway-backed implementations, and tests substitute
//! recording fakes.

pub mod apigw;
pub mod chat;
pub mod connections;
pub mod drivers;
pub mod dynamo;
pub mod push;

use std::error::Error;
use std::fmt;

/// Backend failure reported by a store adapter. Callers log it and skip
/// the affected step; on its own it never fails an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StoreError {}
