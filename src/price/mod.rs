pub mod coingecko;
pub mod retry;

use alloy::primitives::Address;
use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::model::amount::FixedPoint;

/// USD price source.
///
/// Prices come back as [`FixedPoint`] at `PRICE_DECIMALS`; floats never leave
/// the implementation.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Prices aligned by position with `tokens`. Callers deduplicate first
    /// when they want one price per distinct token.
    async fn token_prices(&self, tokens: &[Address]) -> Result<Vec<FixedPoint>>;

    async fn token_price(&self, token: Address) -> Result<FixedPoint> {
        self.token_prices(&[token])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no price returned for {token}"))
    }
}
