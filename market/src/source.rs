use async_trait::async_trait;

use crate::errors::PriceSourceError;
use crate::types::PriceSnapshot;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Full list of current quotes in one round trip.
    ///
    /// An empty list is reported as [`PriceSourceError::Empty`], so `Ok`
    /// always carries at least one quote.
    async fn fetch_snapshot(&self) -> Result<PriceSnapshot, PriceSourceError>;
}
