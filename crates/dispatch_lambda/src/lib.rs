//! AWS-oriented adapters and handlers for the ride dispatch sockets.
//!
//! This crate owns runtime integration details (Lambda handlers, DynamoDB
//! store adapters, and the API Gateway push channel) around the pure
//! primitives in `dispatch_core`. Handlers depend only on the adapter
//! traits; the binaries wire in the AWS-backed implementations.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod log;
