use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::{Address, I256};
use thiserror::Error;

/// Fixed precision of every USD value produced by the engine.
pub const USD_DECIMALS: u8 = 8;
/// Precision of target weight fractions (1.0 == 10^8).
pub const WEIGHT_DECIMALS: u8 = 8;
/// Precision prices are converted to at the oracle boundary.
pub const PRICE_DECIMALS: u8 = 8;
/// Precision of slippage fractions.
pub const SLIPPAGE_DECIMALS: u8 = 4;
/// Precision of the per-run position growth cap.
pub const POSITION_ADD_PCT_DECIMALS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("invalid decimal `{value}`: {reason}")]
    InvalidDecimal { value: String, reason: String },

    #[error("non-finite number {0}")]
    NonFinite(f64),
}

// ── Fixed-point number ───────────────────────────────────────────────

/// A signed integer tagged with the number of decimals it is expressed in.
///
/// `FixedPoint { value: 230_000_000, decimals: 8 }` is 2.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    pub value: I256,
    pub decimals: u8,
}

impl FixedPoint {
    pub const fn new(value: I256, decimals: u8) -> Self {
        FixedPoint { value, decimals }
    }

    /// Parse a decimal string such as `"0.05"` or `"-1.0"`.
    pub fn parse(value: &str, decimals: u8) -> Result<Self, AmountError> {
        let parsed = parse_units(value.trim(), decimals).map_err(|e| AmountError::InvalidDecimal {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        Ok(FixedPoint::new(parsed.get_signed(), decimals))
    }

    /// Convert a float (e.g. a price from an HTTP API) to fixed point.
    /// Digits beyond `decimals` are rounded by the float formatter.
    pub fn from_f64(value: f64, decimals: u8) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite(value));
        }
        let text = format!("{:.*}", decimals as usize, value);
        Self::parse(&text, decimals)
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }
}

impl std::fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_amount(self.value, self.decimals))
    }
}

/// Human-readable rendering for logs; falls back to the raw integer.
pub fn format_amount(value: I256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}

// ── Token amounts ────────────────────────────────────────────────────

/// An amount of a single token.
///
/// `amount` is in the token's native decimals unless the producing function
/// says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub address: Address,
    pub amount: I256,
}

impl TokenAmount {
    pub const fn new(address: Address, amount: I256) -> Self {
        TokenAmount { address, amount }
    }
}

/// Signed capital imbalance of one reserve pool, in the pool's underlyer
/// decimals.
///
/// Negative: the pool holds more than its target and the excess can fund the
/// LP account. Positive: the pool is short and must be topped up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceAmount {
    pub address: Address,
    pub amount: I256,
}

impl RebalanceAmount {
    pub const fn new(address: Address, amount: I256) -> Self {
        RebalanceAmount { address, amount }
    }

    pub fn is_excess(&self) -> bool {
        self.amount.is_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i(v: i64) -> I256 {
        I256::try_from(v).unwrap()
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(FixedPoint::parse("0.05", 4).unwrap().value, i(500));
        assert_eq!(FixedPoint::parse("1.2", 4).unwrap().value, i(12_000));
        assert_eq!(FixedPoint::parse("-1.0", 4).unwrap().value, i(-10_000));
        assert!(FixedPoint::parse("abc", 4).is_err());
    }

    #[test]
    fn converts_floats_at_fixed_precision() {
        let price = FixedPoint::from_f64(2.3, PRICE_DECIMALS).unwrap();
        assert_eq!(price.value, i(230_000_000));
        assert_eq!(price.decimals, PRICE_DECIMALS);
        assert!(FixedPoint::from_f64(f64::NAN, PRICE_DECIMALS).is_err());
    }

    #[test]
    fn negative_excess_convention() {
        let addr = Address::ZERO;
        assert!(RebalanceAmount::new(addr, i(-1)).is_excess());
        assert!(!RebalanceAmount::new(addr, i(0)).is_excess());
        assert!(!RebalanceAmount::new(addr, i(1)).is_excess());
    }
}
