pub mod dry_run;
pub mod safe;

use alloy::primitives::B256;
use anyhow::Result;
use async_trait::async_trait;

use crate::chain::TxRequest;

/// What came back from a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
}

/// Outcome of handing a transaction to an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Mined successfully.
    Executed(TxReceipt),
    /// Nothing was broadcast (dry run, or no trackable response).
    NotSubmitted,
}

impl Execution {
    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            Execution::Executed(receipt) => Some(receipt),
            Execution::NotSubmitted => None,
        }
    }
}

/// Submits transactions on behalf of the LP Safe.
#[async_trait]
pub trait TxExecutor: Send + Sync {
    async fn execute(&self, tx: &TxRequest) -> Result<Execution>;
}
