use alloy::primitives::{I256, U256};
use futures::future::try_join_all;

use crate::chain::ChainReader;
use crate::model::amount::TokenAmount;

use super::error::{Result, StrategyError};

/// `10^decimals` as a signed 256-bit integer.
pub fn ten_pow(decimals: u8) -> Result<I256> {
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .and_then(|p| I256::try_from(p).ok())
        .ok_or(StrategyError::Overflow("power of ten"))
}

/// Rescale `amount` from `from` to `to` decimals: `amount * 10^to / 10^from`.
///
/// Division truncates toward zero, which equals floor for the non-negative
/// amounts the engine compares. Narrowing loses the dropped digits.
pub fn normalize(amount: I256, from: u8, to: u8) -> Result<I256> {
    amount
        .checked_mul(ten_pow(to)?)
        .and_then(|scaled| scaled.checked_div(ten_pow(from).ok()?))
        .ok_or(StrategyError::Overflow("normalized amount"))
}

/// Rescale a token amount to `to` decimals, looking up the token's own
/// decimals on chain.
pub async fn convert_token_amount(
    token_amount: &TokenAmount,
    to: u8,
    chain: &dyn ChainReader,
) -> Result<TokenAmount> {
    let from = chain.decimals(token_amount.address).await?;
    Ok(TokenAmount::new(
        token_amount.address,
        normalize(token_amount.amount, from, to)?,
    ))
}

/// [`convert_token_amount`] over a list, preserving order. Decimals lookups
/// run concurrently.
pub async fn normalize_many(
    token_amounts: &[TokenAmount],
    to: u8,
    chain: &dyn ChainReader,
) -> Result<Vec<TokenAmount>> {
    try_join_all(
        token_amounts
            .iter()
            .map(|ta| convert_token_amount(ta, to, chain)),
    )
    .await
}

/// Reinterpret an unsigned on-chain amount as signed.
pub fn to_signed(value: U256) -> Result<I256> {
    I256::try_from(value).map_err(|_| StrategyError::Overflow("signed amount"))
}

/// Convert a non-negative signed amount back to a contract argument.
pub fn to_unsigned(value: I256, what: &'static str) -> Result<U256> {
    if value.is_negative() {
        return Err(StrategyError::Negative(what));
    }
    Ok(value.into_raw())
}
