#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{Address, B256, I256, U256};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use lp_autotasks::chain::{ChainReader, TxRequest};
use lp_autotasks::model::amount::{FixedPoint, PRICE_DECIMALS, USD_DECIMALS};
use lp_autotasks::model::config::{Config, ReservePool, ReservePools, SizingConfig, SwapConfig};
use lp_autotasks::model::position::{PositionToken, TargetWeight};
use lp_autotasks::price::PriceSource;
use lp_autotasks::run::executor::{Execution, TxExecutor, TxReceipt};

// ── Numbers and addresses ────────────────────────────────────────────

pub fn i(v: i128) -> I256 {
    I256::try_from(v).unwrap()
}

pub fn u(v: u128) -> U256 {
    U256::from(v)
}

/// `v * 10^decimals` as a signed amount.
pub fn units(v: i128, decimals: u8) -> I256 {
    i(v) * I256::try_from(U256::from(10u8).pow(U256::from(decimals))).unwrap()
}

pub fn uunits(v: u128, decimals: u8) -> U256 {
    U256::from(v) * U256::from(10u8).pow(U256::from(decimals))
}

pub fn addr(n: u8) -> Address {
    Address::with_last_byte(n)
}

pub fn price(p: &str) -> FixedPoint {
    FixedPoint::parse(p, PRICE_DECIMALS).unwrap()
}

pub fn usd(v: i128) -> I256 {
    units(v, USD_DECIMALS)
}

// Reserve pools R0 (U0, 18 decimals) and R1 (U1, 6 decimals).
pub const R0: Address = Address::with_last_byte(0xA0);
pub const R1: Address = Address::with_last_byte(0xA1);
pub const U0: Address = Address::with_last_byte(0xB0);
pub const U1: Address = Address::with_last_byte(0xB1);

pub const LP_SAFE: Address = Address::with_last_byte(0xC0);
pub const LP_ACCOUNT: Address = Address::with_last_byte(0xC1);
pub const META_POOL_TOKEN: Address = Address::with_last_byte(0xC2);
pub const TVL_MANAGER: Address = Address::with_last_byte(0xC3);

pub const CRV: Address = Address::with_last_byte(0xD0);
pub const CVX: Address = Address::with_last_byte(0xD1);

pub fn reserve_pools() -> ReservePools {
    ReservePools::new(vec![
        ReservePool {
            address: R0,
            underlyer: U0,
            underlyer_decimals: 18,
            id: 0,
        },
        ReservePool {
            address: R1,
            underlyer: U1,
            underlyer_decimals: 6,
            id: 1,
        },
    ])
}

pub fn swap(key: &str, name: &str, token: Address, slippage: &str) -> SwapConfig {
    SwapConfig {
        key: key.to_string(),
        name: name.to_string(),
        token,
        in_token_decimals: 18,
        out_token_decimals: 6,
        slippage: slippage.to_string(),
    }
}

pub fn weights(entries: &[(&str, &str)]) -> Vec<TargetWeight> {
    entries
        .iter()
        .map(|(name, w)| TargetWeight {
            name: name.to_string(),
            weight: FixedPoint::parse(w, 8).unwrap().value,
        })
        .collect()
}

pub fn test_config() -> Config {
    Config {
        lp_safe: LP_SAFE,
        lp_account: LP_ACCOUNT,
        meta_pool_token: META_POOL_TOKEN,
        tvl_manager: TVL_MANAGER,
        reserve_pools: reserve_pools(),
        target_weights: weights(&[("convex-3pool", "0.20"), ("convex-frax", "0.30"), ("convex-susdv2", "0.50")]),
        swaps: vec![
            swap("CRV", "crv-to-usdc", CRV, "0.05"),
            swap("CVX", "cvx-to-usdc", CVX, "0.05"),
        ],
        depeg_thresholds: HashMap::new(),
        curve_pools: HashMap::new(),
        sizing: SizingConfig {
            position_add_pct: FixedPoint::parse("0.20", 4).unwrap(),
            max_add_liquidity: usd(20_000),
            min_swap_usd: usd(100),
        },
    }
}

// ── Mock chain ───────────────────────────────────────────────────────

/// In-memory chain state. Missing entries are read errors, except
/// unregistered allocation names, which resolve to the zero address.
#[derive(Default)]
pub struct MockChain {
    pub decimals: HashMap<Address, u8>,
    /// (token, account) → balance
    pub balances: HashMap<(Address, Address), U256>,
    pub rebalance_amounts: (Vec<Address>, Vec<I256>),
    pub allocations: HashMap<String, Address>,
    pub allocation_tokens: HashMap<Address, Vec<PositionToken>>,
    /// (allocation, token index) → balance held for the LP account
    pub allocation_balances: HashMap<(Address, u8), U256>,
    pub allocation_names: HashMap<Address, String>,
    pub zaps: Vec<String>,
    pub lp_balances: HashMap<String, U256>,
    /// Ids passed to `rebalance_amounts`.
    pub requested_ids: Mutex<Vec<Vec<u64>>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    pub fn with_balance(mut self, token: Address, account: Address, balance: U256) -> Self {
        self.balances.insert((token, account), balance);
        self
    }

    pub fn with_rebalance_amounts(mut self, amounts: &[(Address, I256)]) -> Self {
        self.rebalance_amounts = amounts.iter().copied().unzip();
        self
    }

    /// Register `name` as an allocation holding `tokens` (token, decimals,
    /// balance), in index order.
    pub fn with_allocation(mut self, name: &str, allocation: Address, tokens: &[(Address, u8, U256)]) -> Self {
        self.allocations.insert(name.to_string(), allocation);
        self.allocation_names.insert(allocation, name.to_string());
        self.allocation_tokens.insert(
            allocation,
            tokens
                .iter()
                .map(|(token, decimals, _)| PositionToken {
                    token: *token,
                    decimals: *decimals,
                })
                .collect(),
        );
        for (index, (_, _, balance)) in tokens.iter().enumerate() {
            self.allocation_balances.insert((allocation, index as u8), *balance);
        }
        self
    }

    pub fn with_zaps(mut self, zaps: &[&str]) -> Self {
        self.zaps = zaps.iter().map(|z| z.to_string()).collect();
        self
    }

    pub fn with_lp_balance(mut self, zap: &str, balance: U256) -> Self {
        self.lp_balances.insert(zap.to_string(), balance);
        self
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn decimals(&self, token: Address) -> Result<u8> {
        self.decimals
            .get(&token)
            .copied()
            .ok_or_else(|| anyhow!("{token}.decimals() reverted"))
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        Ok(self.balances.get(&(token, account)).copied().unwrap_or(U256::ZERO))
    }

    async fn rebalance_amounts(&self, meta_pool_token: Address, ids: &[u64]) -> Result<(Vec<Address>, Vec<I256>)> {
        if meta_pool_token != META_POOL_TOKEN {
            bail!("unexpected meta pool token {meta_pool_token}");
        }
        self.requested_ids.lock().unwrap().push(ids.to_vec());
        Ok(self.rebalance_amounts.clone())
    }

    async fn asset_allocation(&self, _tvl_manager: Address, name: &str) -> Result<Address> {
        Ok(self.allocations.get(name).copied().unwrap_or(Address::ZERO))
    }

    async fn allocation_tokens(&self, allocation: Address) -> Result<Vec<PositionToken>> {
        self.allocation_tokens
            .get(&allocation)
            .cloned()
            .ok_or_else(|| anyhow!("{allocation}.tokens() reverted"))
    }

    async fn allocation_balance(&self, allocation: Address, account: Address, index: u8) -> Result<U256> {
        if account != LP_ACCOUNT {
            bail!("balance requested for {account}, not the LP account");
        }
        self.allocation_balances
            .get(&(allocation, index))
            .copied()
            .ok_or_else(|| anyhow!("{allocation}.balanceOf(.., {index}) reverted"))
    }

    async fn allocation_name(&self, allocation: Address) -> Result<String> {
        self.allocation_names
            .get(&allocation)
            .cloned()
            .ok_or_else(|| anyhow!("{allocation}.NAME() reverted"))
    }

    async fn zap_names(&self, _lp_account: Address) -> Result<Vec<String>> {
        Ok(self.zaps.clone())
    }

    async fn lp_token_balance(&self, _lp_account: Address, zap: &str) -> Result<U256> {
        self.lp_balances
            .get(zap)
            .copied()
            .ok_or_else(|| anyhow!("getLpTokenBalance({zap}) reverted"))
    }
}

// ── Mock prices ──────────────────────────────────────────────────────

/// Fixed USD prices; records every batch it is asked for.
#[derive(Default)]
pub struct MockPrices {
    pub prices: HashMap<Address, FixedPoint>,
    pub calls: Mutex<Vec<Vec<Address>>>,
}

impl MockPrices {
    pub fn new(prices: &[(Address, &str)]) -> Self {
        MockPrices {
            prices: prices.iter().map(|(a, p)| (*a, price(p))).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Address>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for MockPrices {
    async fn token_prices(&self, tokens: &[Address]) -> Result<Vec<FixedPoint>> {
        self.calls.lock().unwrap().push(tokens.to_vec());
        tokens
            .iter()
            .map(|t| {
                self.prices
                    .get(t)
                    .copied()
                    .ok_or_else(|| anyhow!("500 Internal Server Error for {t}"))
            })
            .collect()
    }
}

// ── Mock executor ────────────────────────────────────────────────────

/// Records transactions and reports each as mined.
#[derive(Default)]
pub struct MockExecutor {
    pub executed: Mutex<Vec<TxRequest>>,
    pub fail: bool,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        MockExecutor {
            executed: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn executed(&self) -> Vec<TxRequest> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxExecutor for MockExecutor {
    async fn execute(&self, tx: &TxRequest) -> Result<Execution> {
        if self.fail {
            bail!("Safe transaction reverted");
        }
        let mut executed = self.executed.lock().unwrap();
        executed.push(tx.clone());
        Ok(Execution::Executed(TxReceipt {
            transaction_hash: B256::with_last_byte(executed.len() as u8),
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: 1,
        }))
    }
}
