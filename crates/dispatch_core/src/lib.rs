//! Transport-free ride dispatch domain primitives.
//!
//! This crate owns coordinate validation, geohash cell encoding, inbound
//! envelope classification, and the record shapes shared with the store
//! adapters. It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod envelope;
pub mod geo;
pub mod geohash;
pub mod records;
