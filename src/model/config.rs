use std::collections::{BTreeMap, HashMap};

use alloy::primitives::{Address, I256, address};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::amount::FixedPoint;
use super::position::TargetWeight;

// ── Well-known mainnet addresses ─────────────────────────────────────

pub mod mainnet {
    use super::*;

    pub const LP_SAFE: Address = address!("5b79121EA6dC2395B8046eCDCE14D66c2bF221B0");
    pub const LP_ACCOUNT: Address = address!("E08Ee4C1b248464aAcC5c0130247b1B9d9e6005E");

    pub const CRV: Address = address!("D533a949740bb3306d119CC777fa900bA034cd52");
    pub const CVX: Address = address!("4e3FBD56CD56c3e72c1403e103b45Db9da5B9D2B");

    pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
    pub const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    pub const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
    pub const MUSD: Address = address!("e2f2a5C287993345a840Db3B0845fbC70f5935a5");

    pub const THREEPOOL_STABLESWAP: Address = address!("bEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7");
    pub const MUSD_STABLESWAP: Address = address!("8474DdbE98F5aA3179B3B3F5942D724aFcdec9f6");
}

// ── Config file model ────────────────────────────────────────────────

/// On-disk autotask configuration.
///
/// Addresses are hex strings and amounts are decimal strings; everything is
/// parsed and checked once at startup into [`Config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigFile {
    /// Safe that owns the LP account and executes every mutating transaction.
    #[serde(default = "default_lp_safe")]
    pub lp_safe: String,
    /// LP account holding deployed capital and reward tokens.
    #[serde(default = "default_lp_account")]
    pub lp_account: String,
    /// Reserve accounting contract (reports rebalance amounts, funds the LP account).
    pub meta_pool_token: String,
    /// Registry of named asset allocations.
    pub tvl_manager: String,
    /// Reserve pools funding the LP account.
    pub reserve_pools: Vec<ReservePoolEntry>,
    /// Target NAV fraction per position name.
    pub target_weights: Vec<TargetWeightEntry>,
    /// Reward-token swaps performed by the harvest job, in execution order.
    #[serde(default = "default_swaps")]
    pub swaps: Vec<SwapEntry>,
    /// Token address → USD price below which the token counts as depegged.
    #[serde(default = "default_depeg_thresholds")]
    pub depeg_thresholds: BTreeMap<String, String>,
    /// Curve pool address → tokens to check for a depeg.
    #[serde(default = "default_curve_pools")]
    pub curve_pools: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub sizing: SizingEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReservePoolEntry {
    pub address: String,
    pub underlyer: String,
    pub underlyer_decimals: i64,
    /// Id used by the meta-pool token for this pool.
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetWeightEntry {
    pub name: String,
    /// Fraction of NAV as a decimal string, e.g. "0.25".
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SwapEntry {
    /// Short key used on the command line and in logs, e.g. "CRV".
    pub key: String,
    /// Swap name registered on the LP account, e.g. "crv-to-usdc".
    pub name: String,
    /// Input (reward) token.
    pub token: String,
    pub in_token_decimals: i64,
    pub out_token_decimals: i64,
    /// Accepted slippage as a decimal fraction, e.g. "0.05".
    pub slippage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SizingEntry {
    /// Largest fraction of a position's value added in one run.
    #[serde(default = "default_position_add_pct")]
    pub position_add_pct: String,
    /// Absolute ceiling (USD) for one liquidity deployment.
    #[serde(default = "default_max_add_liquidity")]
    pub max_add_liquidity: String,
    /// Reward swaps worth less than this (USD) are skipped.
    #[serde(default = "default_min_swap_usd")]
    pub min_swap_usd: String,
}

impl ConfigFile {
    /// Config with every defaulted field at its default and no reserve pools
    /// or target weights.
    pub fn new(meta_pool_token: impl Into<String>, tvl_manager: impl Into<String>) -> Self {
        ConfigFile {
            lp_safe: default_lp_safe(),
            lp_account: default_lp_account(),
            meta_pool_token: meta_pool_token.into(),
            tvl_manager: tvl_manager.into(),
            reserve_pools: Vec::new(),
            target_weights: Vec::new(),
            swaps: default_swaps(),
            depeg_thresholds: default_depeg_thresholds(),
            curve_pools: default_curve_pools(),
            sizing: SizingEntry::default(),
        }
    }
}

impl Default for SizingEntry {
    fn default() -> Self {
        SizingEntry {
            position_add_pct: default_position_add_pct(),
            max_add_liquidity: default_max_add_liquidity(),
            min_swap_usd: default_min_swap_usd(),
        }
    }
}

fn default_lp_safe() -> String {
    mainnet::LP_SAFE.to_string()
}
fn default_lp_account() -> String {
    mainnet::LP_ACCOUNT.to_string()
}
fn default_position_add_pct() -> String {
    "0.20".into()
}
fn default_max_add_liquidity() -> String {
    "20000".into()
}
fn default_min_swap_usd() -> String {
    "100".into()
}

fn default_swaps() -> Vec<SwapEntry> {
    [("CRV", "crv-to-usdc", mainnet::CRV), ("CVX", "cvx-to-usdc", mainnet::CVX)]
        .into_iter()
        .map(|(key, name, token)| SwapEntry {
            key: key.into(),
            name: name.into(),
            token: token.to_string(),
            in_token_decimals: 18,
            out_token_decimals: 6,
            slippage: "0.05".into(),
        })
        .collect()
}

fn default_depeg_thresholds() -> BTreeMap<String, String> {
    [mainnet::MUSD, mainnet::DAI, mainnet::USDC, mainnet::USDT]
        .into_iter()
        .map(|token| (token.to_string(), "0.9".to_string()))
        .collect()
}

fn default_curve_pools() -> BTreeMap<String, Vec<String>> {
    let three_pool = vec![mainnet::DAI, mainnet::USDC, mainnet::USDT];
    let mut musd_pool = vec![mainnet::MUSD];
    musd_pool.extend(three_pool.iter().copied());

    let render = |tokens: Vec<Address>| tokens.iter().map(|t| t.to_string()).collect();
    BTreeMap::from([
        (mainnet::THREEPOOL_STABLESWAP.to_string(), render(three_pool)),
        (mainnet::MUSD_STABLESWAP.to_string(), render(musd_pool)),
    ])
}

// ── Validated config ─────────────────────────────────────────────────

/// A configured reserve pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservePool {
    pub address: Address,
    pub underlyer: Address,
    pub underlyer_decimals: u8,
    pub id: u64,
}

/// Reserve pools keyed by pool address, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservePools(Vec<ReservePool>);

impl ReservePools {
    pub fn new(pools: Vec<ReservePool>) -> Self {
        ReservePools(pools)
    }

    pub fn get(&self, address: &Address) -> Option<&ReservePool> {
        self.0.iter().find(|p| p.address == *address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReservePool> {
        self.0.iter()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.0.iter().map(|p| p.id).collect()
    }

    /// Distinct underlyers in configuration order.
    pub fn underlyers(&self) -> Vec<Address> {
        let mut out: Vec<Address> = Vec::new();
        for pool in &self.0 {
            if !out.contains(&pool.underlyer) {
                out.push(pool.underlyer);
            }
        }
        out
    }

    pub fn max_underlyer_decimals(&self) -> Option<u8> {
        self.0.iter().map(|p| p.underlyer_decimals).max()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapConfig {
    pub key: String,
    pub name: String,
    pub token: Address,
    pub in_token_decimals: u8,
    pub out_token_decimals: u8,
    /// Decimal fraction string, checked at load time.
    pub slippage: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingConfig {
    pub position_add_pct: FixedPoint,
    /// USD at `USD_DECIMALS`.
    pub max_add_liquidity: I256,
    /// USD at `USD_DECIMALS`.
    pub min_swap_usd: I256,
}

/// Immutable process-wide configuration, built by `validate::load_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub lp_safe: Address,
    pub lp_account: Address,
    pub meta_pool_token: Address,
    pub tvl_manager: Address,
    pub reserve_pools: ReservePools,
    pub target_weights: Vec<TargetWeight>,
    pub swaps: Vec<SwapConfig>,
    /// Threshold prices at `PRICE_DECIMALS`.
    pub depeg_thresholds: HashMap<Address, FixedPoint>,
    pub curve_pools: HashMap<Address, Vec<Address>>,
    pub sizing: SizingConfig,
}

impl Config {
    pub fn swap(&self, key: &str) -> Option<&SwapConfig> {
        self.swaps.iter().find(|s| s.key == key)
    }

    pub fn target_names(&self) -> Vec<String> {
        self.target_weights.iter().map(|w| w.name.clone()).collect()
    }
}
