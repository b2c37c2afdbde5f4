use std::collections::HashMap;

use alloy::primitives::{Address, I256};

use crate::chain::ChainReader;
use crate::model::amount::{RebalanceAmount, TokenAmount};
use crate::model::config::ReservePools;

use super::error::{Result, StrategyError, ensure_same_len};
use super::normalize::{normalize, normalize_many};

/// Precision net-excess amounts are compared at.
pub const COMPARISON_DECIMALS: u8 = 18;

/// Pair the two arrays returned by `getRebalanceAmounts`.
pub fn pair_rebalance_amounts(pools: Vec<Address>, amounts: Vec<I256>) -> Result<Vec<RebalanceAmount>> {
    ensure_same_len("rebalance amounts", pools.len(), amounts.len())?;
    Ok(pools
        .into_iter()
        .zip(amounts)
        .map(|(address, amount)| RebalanceAmount::new(address, amount))
        .collect())
}

/// Per-underlyer surplus: `balance - rebalance amount`, keeping only positive
/// results, in input order.
///
/// A negative rebalance amount (pool over target) adds to the surplus; a
/// positive one (pool short) eats into it.
pub fn underlyers_with_net_excess(
    rebalance_amounts: &[RebalanceAmount],
    balances: &HashMap<Address, I256>,
    pools: &ReservePools,
) -> Result<Vec<TokenAmount>> {
    let mut excess = Vec::new();
    for ra in rebalance_amounts {
        let pool = pools
            .get(&ra.address)
            .ok_or(StrategyError::UnconfiguredReservePool(ra.address))?;
        let balance = balances
            .get(&pool.underlyer)
            .ok_or(StrategyError::MissingBalance(pool.underlyer))?;
        let net = balance
            .checked_sub(ra.amount)
            .ok_or(StrategyError::Overflow("net excess"))?;
        if net > I256::ZERO {
            excess.push(TokenAmount::new(pool.underlyer, net));
        }
    }
    Ok(excess)
}

/// Largest amount after normalizing every entry to `decimals`. The result is
/// the normalized amount. Ties keep the first entry.
pub async fn largest_token_amount(
    token_amounts: &[TokenAmount],
    decimals: u8,
    chain: &dyn ChainReader,
) -> Result<TokenAmount> {
    let normalized = normalize_many(token_amounts, decimals, chain).await?;
    normalized
        .into_iter()
        .reduce(|best, ta| if ta.amount > best.amount { ta } else { best })
        .ok_or_else(|| StrategyError::nothing_to_do("No token amounts with excess"))
}

/// Reserve ids of pools holding excess (negative rebalance amount).
pub fn excess_reserve_ids(rebalance_amounts: &[RebalanceAmount], pools: &ReservePools) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for ra in rebalance_amounts.iter() {
        let pool = pools
            .get(&ra.address)
            .ok_or(StrategyError::UnconfiguredReservePool(ra.address))?;
        if ra.is_excess() {
            ids.push(pool.id);
        }
    }
    Ok(ids)
}

/// Rescale every amount from its pool's underlyer decimals to the largest
/// configured underlyer decimals.
pub fn normalize_rebalance_amounts(
    rebalance_amounts: &[RebalanceAmount],
    pools: &ReservePools,
) -> Result<Vec<RebalanceAmount>> {
    // With no pools configured every lookup below fails anyway.
    let target = pools.max_underlyer_decimals().unwrap_or(0);
    rebalance_amounts
        .iter()
        .map(|ra| {
            let pool = pools
                .get(&ra.address)
                .ok_or(StrategyError::UnconfiguredReservePool(ra.address))?;
            Ok(RebalanceAmount::new(
                ra.address,
                normalize(ra.amount, pool.underlyer_decimals, target)?,
            ))
        })
        .collect()
}
