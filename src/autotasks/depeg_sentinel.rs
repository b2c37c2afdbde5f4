//! Filters Curve pool sentinel matches down to pools holding a depegged
//! stablecoin.

use std::collections::HashMap;

use alloy::primitives::Address;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::engine::error::{Result, StrategyError, ensure_same_len};
use crate::engine::normalize::normalize;
use crate::model::amount::FixedPoint;
use crate::model::config::Config;
use crate::price::PriceSource;

// ── Payload ──────────────────────────────────────────────────────────

/// Body a sentinel posts to the autotask.
#[derive(Debug, Clone, Deserialize)]
pub struct SentinelPayload {
    /// Absent when the job was started by hand or by a schedule.
    pub request: Option<SentinelRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentinelRequest {
    pub body: ConditionRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionRequest {
    pub events: Vec<SentinelEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentinelEvent {
    pub hash: String,
    #[serde(rename = "matchedAddresses")]
    pub matched_addresses: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentinelResponse {
    pub matches: Vec<Match>,
}

// ── Event grouping ───────────────────────────────────────────────────

/// Pool address → events that matched it. An event matching several pools
/// appears in each group.
pub fn grouped_events(events: &[SentinelEvent]) -> HashMap<Address, Vec<&SentinelEvent>> {
    let mut groups: HashMap<Address, Vec<&SentinelEvent>> = HashMap::new();
    for event in events {
        for address in &event.matched_addresses {
            groups.entry(*address).or_default().push(event);
        }
    }
    groups
}

/// Matched pool addresses, first-seen order, no repeats.
pub fn unique_pool_addresses(events: &[SentinelEvent]) -> Vec<Address> {
    let mut pools: Vec<Address> = Vec::new();
    for address in events.iter().flat_map(|e| &e.matched_addresses) {
        if !pools.contains(address) {
            pools.push(*address);
        }
    }
    pools
}

// ── Depeg checks ─────────────────────────────────────────────────────

pub fn validate_prices(prices: &[FixedPoint]) -> Result<()> {
    if prices.iter().any(FixedPoint::is_negative) {
        return Err(StrategyError::Negative("Token price"));
    }
    Ok(())
}

/// True when any token trades below its threshold.
pub fn is_depegged(
    prices: &[FixedPoint],
    tokens: &[Address],
    thresholds: &HashMap<Address, FixedPoint>,
) -> Result<bool> {
    ensure_same_len("prices vs token addresses", prices.len(), tokens.len())?;

    let mut depegged = false;
    for (price, token) in prices.iter().zip(tokens) {
        let threshold = thresholds
            .get(token)
            .ok_or(StrategyError::UnconfiguredDepegThreshold(*token))?;
        let price = normalize(price.value, price.decimals, threshold.decimals)?;
        if price < threshold.value {
            tracing::info!(%token, price = %FixedPoint::new(price, threshold.decimals), %threshold, "token below peg threshold");
            depegged = true;
        }
    }
    Ok(depegged)
}

pub fn matches_from_events(events: &[&SentinelEvent]) -> Vec<Match> {
    events
        .iter()
        .map(|e| Match {
            hash: e.hash.clone(),
        })
        .collect()
}

/// Matches for `pool`'s events when any of the pool's tokens is depegged.
pub async fn depegged_matches_for_pool(
    pool: Address,
    grouped: &HashMap<Address, Vec<&SentinelEvent>>,
    prices: &dyn PriceSource,
    config: &Config,
) -> Result<Vec<Match>> {
    let tokens = config
        .curve_pools
        .get(&pool)
        .ok_or(StrategyError::UnconfiguredCurvePool(pool))?;

    let token_prices = prices.token_prices(tokens).await?;
    validate_prices(&token_prices)?;

    if !is_depegged(&token_prices, tokens, &config.depeg_thresholds)? {
        return Ok(Vec::new());
    }
    Ok(grouped
        .get(&pool)
        .map(|events| matches_from_events(events))
        .unwrap_or_default())
}

/// Per-pool matches, checked concurrently, empty groups dropped. Any failure
/// fails the whole run.
pub async fn depegged_matches_for_pools(
    pools: &[Address],
    grouped: &HashMap<Address, Vec<&SentinelEvent>>,
    prices: &dyn PriceSource,
    config: &Config,
) -> Result<Vec<Vec<Match>>> {
    let matches = try_join_all(
        pools
            .iter()
            .map(|pool| depegged_matches_for_pool(*pool, grouped, prices, config)),
    )
    .await?;
    Ok(matches.into_iter().filter(|m| !m.is_empty()).collect())
}

pub async fn run(
    payload: &SentinelPayload,
    prices: &dyn PriceSource,
    config: &Config,
) -> Result<SentinelResponse> {
    let request = payload
        .request
        .as_ref()
        .ok_or(StrategyError::MissingSentinelRequest)?;
    let events = &request.body.events;

    let pools = unique_pool_addresses(events);
    let grouped = grouped_events(events);

    let matches = depegged_matches_for_pools(&pools, &grouped, prices, config).await?;
    Ok(SentinelResponse {
        matches: matches.into_iter().flatten().collect(),
    })
}
