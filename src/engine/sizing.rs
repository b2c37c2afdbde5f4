use std::collections::HashMap;

use alloy::primitives::{Address, I256, U256};
use futures::future::try_join_all;

use crate::chain::evm::{ILpAccount, IMetaPoolToken};
use crate::chain::{ChainReader, TxRequest};
use crate::model::amount::{RebalanceAmount, TokenAmount, USD_DECIMALS, format_amount};
use crate::model::config::{Config, SizingConfig};
use crate::model::position::Position;
use crate::price::PriceSource;

use super::allocator;
use super::error::{Result, StageContext, StrategyError};
use super::normalize::{convert_token_amount, normalize, ten_pow, to_signed, to_unsigned};
use super::reserve::{
    COMPARISON_DECIMALS, largest_token_amount, pair_rebalance_amounts, underlyers_with_net_excess,
};
use super::valuation::TvlManager;

/// Three independent caps on one liquidity deployment, in USD at
/// `USD_DECIMALS`, in this order:
///
/// 1. `position_add_pct` of the target position's current value;
/// 2. the available underlyer balance, taken at 1 underlyer = 1 USD;
/// 3. the absolute `max_add_liquidity` ceiling.
pub fn add_liquidity_candidates(
    position_value: I256,
    balance_usd: I256,
    sizing: &SizingConfig,
) -> Result<[I256; 3]> {
    let pct = sizing.position_add_pct;
    let position_cap = position_value
        .checked_mul(pct.value)
        .ok_or(StrategyError::Overflow("position cap"))?
        / ten_pow(pct.decimals)?;
    Ok([position_cap, balance_usd, sizing.max_add_liquidity])
}

/// The tightest of the candidate caps.
pub fn next_add_liquidity_value(candidates: &[I256; 3]) -> I256 {
    candidates.iter().copied().fold(I256::MAX, std::cmp::min)
}

/// `deployStrategy` amounts: `usd_value` rescaled to the underlyer's decimals
/// at the underlyer's index in the position, zero for every other token.
pub fn deploy_params(position: &Position, underlyer: Address, usd_value: I256) -> Result<Vec<U256>> {
    let index = position
        .token_index(underlyer)
        .ok_or_else(|| StrategyError::TokenNotInPosition {
            token: underlyer,
            position: position.name.clone(),
        })?;
    let amount = normalize(usd_value, USD_DECIMALS, position.tokens[index].decimals)?;

    let mut amounts = vec![U256::ZERO; position.tokens.len()];
    amounts[index] = to_unsigned(amount, "Deploy amount")?;
    Ok(amounts)
}

/// Balance of the token that won net-excess selection, carried forward in
/// the token's own decimals.
pub fn next_balance_from(winner: &TokenAmount, balances: &HashMap<Address, I256>) -> Result<TokenAmount> {
    let amount = balances
        .get(&winner.address)
        .ok_or(StrategyError::MissingBalance(winner.address))?;
    Ok(TokenAmount::new(winner.address, *amount))
}

// ── Strategy ─────────────────────────────────────────────────────────

/// Liquidity-deployment decisions over live chain and price reads.
pub struct Strategy<'a> {
    chain: &'a dyn ChainReader,
    prices: &'a dyn PriceSource,
    config: &'a Config,
}

impl<'a> Strategy<'a> {
    pub fn new(chain: &'a dyn ChainReader, prices: &'a dyn PriceSource, config: &'a Config) -> Self {
        Strategy { chain, prices, config }
    }

    pub fn tvl_manager(&self) -> TvlManager<'a> {
        TvlManager::new(
            self.chain,
            self.prices,
            self.config.tvl_manager,
            self.config.lp_account,
        )
    }

    /// Rebalance amounts for every configured reserve pool.
    pub async fn rebalance_amounts(&self) -> Result<Vec<RebalanceAmount>> {
        let ids = self.config.reserve_pools.ids();
        let (pools, amounts) = self
            .chain
            .rebalance_amounts(self.config.meta_pool_token, &ids)
            .await?;
        pair_rebalance_amounts(pools, amounts)
    }

    /// LP account balance of every configured underlyer.
    pub async fn underlyer_balances(&self) -> Result<HashMap<Address, I256>> {
        let underlyers = self.config.reserve_pools.underlyers();
        let balances = try_join_all(
            underlyers
                .iter()
                .map(|u| self.chain.balance_of(*u, self.config.lp_account)),
        )
        .await?;

        underlyers
            .into_iter()
            .zip(balances)
            .map(|(u, b)| Ok((u, to_signed(b)?)))
            .collect()
    }

    /// Underlyer with the largest net excess, with its full LP account
    /// balance.
    pub async fn next_balance_amount(&self) -> Result<TokenAmount> {
        let (rebalance_amounts, balances) =
            futures::try_join!(self.rebalance_amounts(), self.underlyer_balances())?;

        let excess = underlyers_with_net_excess(&rebalance_amounts, &balances, &self.config.reserve_pools)?;
        let winner = largest_token_amount(&excess, COMPARISON_DECIMALS, self.chain)
            .await
            .stage("Unable to get the next balance amount")?;

        next_balance_from(&winner, &balances)
    }

    /// Registered position furthest below its target value.
    pub async fn next_position(&self) -> Result<Position> {
        let names = self.chain.zap_names(self.config.lp_account).await?;
        let positions = self.tvl_manager().index_positions(&names).await?;
        allocator::next_position(&positions, &self.config.target_weights)
            .stage("Unable to get next position to add liquidity")
    }

    pub async fn possible_next_add_liquidity_values(
        &self,
        next_balance: &TokenAmount,
        next_position: &Position,
    ) -> Result<[I256; 3]> {
        let balance_usd = convert_token_amount(next_balance, USD_DECIMALS, self.chain).await?;
        add_liquidity_candidates(next_position.value, balance_usd.amount, &self.config.sizing)
    }

    /// `deployStrategy` call adding liquidity to the next position from the
    /// next balance.
    pub async fn next_add_liquidity_tx(&self) -> Result<TxRequest> {
        const STAGE: &str = "Unable to create tx to add liquidity";

        let (next_balance, next_position) = futures::try_join!(
            async { self.next_balance_amount().await.stage(STAGE) },
            async { self.next_position().await.stage(STAGE) },
        )?;

        let candidates = self
            .possible_next_add_liquidity_values(&next_balance, &next_position)
            .await
            .stage(STAGE)?;
        let value = next_add_liquidity_value(&candidates);
        if value <= I256::ZERO {
            return Err(StrategyError::nothing_to_do(format!(
                "No liquidity to add to `{}`",
                next_position.name
            )))
            .stage(STAGE);
        }
        tracing::info!(
            position = %next_position.name,
            underlyer = %next_balance.address,
            value = %format_amount(value, USD_DECIMALS),
            "sized liquidity deployment"
        );

        let amounts = deploy_params(&next_position, next_balance.address, value).stage(STAGE)?;
        Ok(TxRequest::call(
            self.config.lp_account,
            &ILpAccount::deployStrategyCall {
                name: next_position.name,
                amounts,
            },
        ))
    }

    /// `fundLpAccount` call moving excess from the given reserve pools.
    pub fn fund_lp_account_tx(&self, ids: &[u64]) -> TxRequest {
        TxRequest::call(
            self.config.meta_pool_token,
            &IMetaPoolToken::fundLpAccountCall {
                ids: ids.iter().map(|id| U256::from(*id)).collect(),
            },
        )
    }
}
