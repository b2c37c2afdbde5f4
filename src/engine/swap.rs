use alloy::primitives::I256;

use crate::model::amount::{FixedPoint, SLIPPAGE_DECIMALS};
use crate::model::config::SwapConfig;
use crate::price::PriceSource;

use super::error::{Result, StrategyError};
use super::normalize::{normalize, ten_pow};
use super::valuation::usd_value;

/// USD value of `amount` at `price`, in the input token's own decimals.
pub fn swap_amount_usd_value(amount: I256, price: &FixedPoint) -> Result<I256> {
    if price.is_negative() {
        return Err(StrategyError::Negative("Token price"));
    }
    usd_value(amount, price)
}

/// Part of `usd_value` given up to slippage, e.g. `"0.05"` for 5%.
pub fn slippage_usd_value(usd_value: I256, slippage: &str) -> Result<I256> {
    let slippage = FixedPoint::parse(slippage, SLIPPAGE_DECIMALS)?;
    if slippage.is_negative() {
        return Err(StrategyError::Negative("Slippage"));
    }
    let scale = ten_pow(SLIPPAGE_DECIMALS)?;
    usd_value
        .checked_mul(slippage.value)
        .map(|v| v / scale)
        .ok_or(StrategyError::Overflow("slippage value"))
}

/// Smallest acceptable swap output, in the output token's decimals.
///
/// Values the input at the current price, deducts slippage, then rescales
/// from input to output decimals. A negative result is an error.
pub async fn swap_min_amount(
    swap: &SwapConfig,
    amount: I256,
    prices: &dyn PriceSource,
) -> Result<I256> {
    let price = prices.token_price(swap.token).await?;

    let usd = swap_amount_usd_value(amount, &price)?;
    let slippage = slippage_usd_value(usd, &swap.slippage)?;

    // Checked before rescaling, where truncation could round a small
    // shortfall up to zero.
    let net = usd
        .checked_sub(slippage)
        .ok_or(StrategyError::Overflow("minimum amount"))?;
    if net.is_negative() {
        return Err(StrategyError::Negative("Minimum amount"));
    }
    normalize(net, swap.in_token_decimals, swap.out_token_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i(v: i128) -> I256 {
        I256::try_from(v).unwrap()
    }

    #[test]
    fn slippage_is_a_fraction_of_value() {
        assert_eq!(slippage_usd_value(i(1000), "0.03").unwrap(), i(30));
        assert_eq!(slippage_usd_value(i(1000), "0").unwrap(), I256::ZERO);
        assert!(slippage_usd_value(i(1000), "-0.01").is_err());
        assert!(slippage_usd_value(i(1000), "lots").is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let price = FixedPoint::parse("-1", 8).unwrap();
        let err = swap_amount_usd_value(i(1000), &price).unwrap_err();
        assert_eq!(err.kind(), crate::engine::ErrorKind::Bounds);
    }
}
