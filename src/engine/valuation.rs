use std::collections::HashMap;

use alloy::primitives::{Address, I256};
use futures::future::try_join_all;

use crate::chain::ChainReader;
use crate::model::amount::{FixedPoint, USD_DECIMALS};
use crate::model::position::{Position, PositionToken};
use crate::price::PriceSource;

use super::error::{Result, StrategyError, ensure_same_len};
use super::normalize::{normalize, ten_pow, to_signed};

/// USD value of `amount` at `price`, keeping `amount`'s precision.
pub fn usd_value(amount: I256, price: &FixedPoint) -> Result<I256> {
    amount
        .checked_mul(price.value)
        .and_then(|v| v.checked_div(ten_pow(price.decimals).ok()?))
        .ok_or(StrategyError::Overflow("USD value"))
}

/// Net asset value: the sum of all position values. Zero for no positions.
pub fn nav(positions: &[Position]) -> Result<I256> {
    positions.iter().try_fold(I256::ZERO, |acc, p| {
        acc.checked_add(p.value).ok_or(StrategyError::Overflow("NAV"))
    })
}

/// Values the protocol's named allocations.
///
/// Balances are those held on behalf of `custodian` (the LP account).
pub struct TvlManager<'a> {
    chain: &'a dyn ChainReader,
    prices: &'a dyn PriceSource,
    tvl_manager: Address,
    custodian: Address,
}

impl<'a> TvlManager<'a> {
    pub fn new(
        chain: &'a dyn ChainReader,
        prices: &'a dyn PriceSource,
        tvl_manager: Address,
        custodian: Address,
    ) -> Self {
        TvlManager {
            chain,
            prices,
            tvl_manager,
            custodian,
        }
    }

    /// Resolve names to allocation addresses, dropping unregistered names.
    pub async fn allocations(&self, names: &[String]) -> Result<Vec<Address>> {
        let addresses = try_join_all(
            names
                .iter()
                .map(|name| self.chain.asset_allocation(self.tvl_manager, name)),
        )
        .await?;
        Ok(addresses.into_iter().filter(|a| *a != Address::ZERO).collect())
    }

    pub async fn allocation_tokens(&self, allocation: Address) -> Result<Vec<PositionToken>> {
        Ok(self.chain.allocation_tokens(allocation).await?)
    }

    /// One batched price call for every distinct token across `token_lists`.
    pub async fn unique_token_prices(
        &self,
        token_lists: &[Vec<PositionToken>],
    ) -> Result<HashMap<Address, FixedPoint>> {
        let mut unique: Vec<Address> = Vec::new();
        for token in token_lists.iter().flatten() {
            if !unique.contains(&token.token) {
                unique.push(token.token);
            }
        }
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let prices = self.prices.token_prices(&unique).await?;
        ensure_same_len("token prices", unique.len(), prices.len())?;
        if prices.iter().any(FixedPoint::is_negative) {
            return Err(StrategyError::Negative("Token price"));
        }

        Ok(unique.into_iter().zip(prices).collect())
    }

    /// USD value of the allocation's `index`th token.
    pub async fn token_value(
        &self,
        allocation: Address,
        token: &PositionToken,
        index: usize,
        prices: &HashMap<Address, FixedPoint>,
    ) -> Result<I256> {
        let index = u8::try_from(index).map_err(|_| StrategyError::Overflow("token index"))?;
        let balance = self
            .chain
            .allocation_balance(allocation, self.custodian, index)
            .await?;
        let normalized = normalize(to_signed(balance)?, token.decimals, USD_DECIMALS)?;
        let price = prices
            .get(&token.token)
            .ok_or(StrategyError::MissingPrice(token.token))?;
        usd_value(normalized, price)
    }

    /// Value one allocation given prices for all of its tokens.
    pub async fn allocation_position(
        &self,
        allocation: Address,
        tokens: Vec<PositionToken>,
        prices: &HashMap<Address, FixedPoint>,
    ) -> Result<Position> {
        let values = try_join_all(
            tokens
                .iter()
                .enumerate()
                .map(|(i, token)| self.token_value(allocation, token, i, prices)),
        );
        let (values, name) = futures::try_join!(values, async {
            Ok::<_, StrategyError>(self.chain.allocation_name(allocation).await?)
        })?;

        let value = values.into_iter().try_fold(I256::ZERO, |acc, v| {
            acc.checked_add(v).ok_or(StrategyError::Overflow("position value"))
        })?;

        Ok(Position { name, value, tokens })
    }

    /// Value every registered allocation among `names`.
    ///
    /// Token lists are read concurrently, then prices are fetched once for the
    /// whole token set, then every allocation is valued concurrently.
    pub async fn index_positions(&self, names: &[String]) -> Result<Vec<Position>> {
        let allocations = self.allocations(names).await?;

        let token_lists = try_join_all(
            allocations
                .iter()
                .map(|allocation| self.allocation_tokens(*allocation)),
        )
        .await?;

        let prices = self.unique_token_prices(&token_lists).await?;

        try_join_all(
            allocations
                .into_iter()
                .zip(token_lists)
                .map(|(allocation, tokens)| self.allocation_position(allocation, tokens, &prices)),
        )
        .await
    }
}
