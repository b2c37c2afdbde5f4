pub mod evm;

use alloy::primitives::{Address, Bytes, I256, U256};
use alloy::sol_types::SolCall;
use anyhow::Result;
use async_trait::async_trait;

use crate::model::position::PositionToken;

// ── Chain reader ─────────────────────────────────────────────────────

/// Read-only view of the protocol contracts.
///
/// The live implementation is [`evm::EvmChainReader`]; tests substitute
/// in-memory mocks. Every method is a single independent view call so callers
/// can fan reads out concurrently.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// ERC-20 `decimals()`.
    async fn decimals(&self, token: Address) -> Result<u8>;

    /// ERC-20 `balanceOf(account)`.
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256>;

    /// `getRebalanceAmounts(ids)` on the meta-pool token: reserve pool
    /// addresses and their signed rebalance amounts, as two parallel arrays.
    async fn rebalance_amounts(
        &self,
        meta_pool_token: Address,
        ids: &[u64],
    ) -> Result<(Vec<Address>, Vec<I256>)>;

    /// `getAssetAllocation(name)` on the TVL manager. Zero when unregistered.
    async fn asset_allocation(&self, tvl_manager: Address, name: &str) -> Result<Address>;

    /// Token composition of an allocation, in allocation index order.
    async fn allocation_tokens(&self, allocation: Address) -> Result<Vec<PositionToken>>;

    /// Balance of the allocation's `index`th token held on behalf of `account`.
    async fn allocation_balance(&self, allocation: Address, account: Address, index: u8) -> Result<U256>;

    /// Display name (`NAME()`) of an allocation.
    async fn allocation_name(&self, allocation: Address) -> Result<String>;

    /// Names of the zaps registered on the LP account.
    async fn zap_names(&self, lp_account: Address) -> Result<Vec<String>>;

    /// LP token balance the LP account holds for one zap.
    async fn lp_token_balance(&self, lp_account: Address, zap: &str) -> Result<U256>;
}

// ── Transaction request ──────────────────────────────────────────────

/// An unsigned call, handed to a [`TxExecutor`](crate::run::executor::TxExecutor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl TxRequest {
    /// Zero-value call encoding `call` for `to`.
    pub fn call<C: SolCall>(to: Address, call: &C) -> Self {
        TxRequest {
            to,
            data: Bytes::from(call.abi_encode()),
            value: U256::ZERO,
        }
    }
}
