//! Read side of the driver location index.

use async_trait::async_trait;
use dispatch_core::records::DriverLocationRecord;

use super::StoreError;

/// Prefix query over persisted driver locations.
///
/// Matching is plain string-prefix containment on the stored cell, so a
/// coarser prefix widens the search area. An empty result is a normal
/// outcome, not an error.
#[async_trait]
pub trait DriverIndex: Send + Sync {
    async fn query_prefix(&self, prefix: &str) -> Result<Vec<DriverLocationRecord>, StoreError>;
}
