use anyhow::Result;
use async_trait::async_trait;

use crate::chain::TxRequest;

use super::{Execution, TxExecutor};

/// Logs each transaction instead of submitting it.
pub struct DryRunExecutor;

#[async_trait]
impl TxExecutor for DryRunExecutor {
    async fn execute(&self, tx: &TxRequest) -> Result<Execution> {
        tracing::info!(to = %tx.to, value = %tx.value, data = %tx.data, "dry run: would execute");
        Ok(Execution::NotSubmitted)
    }
}
