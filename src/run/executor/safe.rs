use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::chain::TxRequest;
use crate::chain::evm::IGnosisSafe;

use super::{Execution, TxExecutor, TxReceipt};

/// `Enum.Operation.Call` in the Safe contracts.
const OPERATION_CALL: u8 = 0;

/// Executes transactions through a Gnosis Safe the signer owns.
///
/// The signer is a Safe owner and the Safe threshold is one, so the owner's
/// pre-validated signature authorizes the call when the owner submits it.
pub struct SafeExecutor {
    provider: DynProvider,
    safe: Address,
    owner: Address,
}

impl SafeExecutor {
    pub fn new(rpc_url: &str, signer: PrivateKeySigner, safe: Address) -> Result<Self> {
        let owner = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(
                rpc_url
                    .parse()
                    .with_context(|| format!("Invalid RPC URL '{rpc_url}'"))?,
            )
            .erased();
        Ok(SafeExecutor {
            provider,
            safe,
            owner,
        })
    }
}

/// Safe signature of type "approved by msg.sender": `r` = owner, `s` = 0, `v` = 1.
pub fn prevalidated_signature(owner: Address) -> Bytes {
    let mut sig = [0u8; 65];
    sig[12..32].copy_from_slice(owner.as_slice());
    sig[64] = 1;
    Bytes::copy_from_slice(&sig)
}

#[async_trait]
impl TxExecutor for SafeExecutor {
    async fn execute(&self, tx: &TxRequest) -> Result<Execution> {
        let safe = IGnosisSafe::new(self.safe, &self.provider);

        let is_owner = safe
            .isOwner(self.owner)
            .call()
            .await
            .context("safe.isOwner() call failed")?;
        if !is_owner {
            bail!("{} is not an owner of Safe {}", self.owner, self.safe);
        }

        let nonce = safe.nonce().call().await.context("safe.nonce() call failed")?;
        tracing::info!(safe = %self.safe, to = %tx.to, %nonce, "executing Safe transaction");

        let pending = safe
            .execTransaction(
                tx.to,
                tx.value,
                tx.data.clone(),
                OPERATION_CALL,
                U256::ZERO,
                U256::ZERO,
                U256::ZERO,
                Address::ZERO,
                Address::ZERO,
                prevalidated_signature(self.owner),
            )
            .send()
            .await
            .context("safe.execTransaction() failed")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("execTransaction receipt")?;

        if !receipt.status() {
            bail!("Safe transaction {} reverted", receipt.transaction_hash);
        }
        tracing::info!(hash = %receipt.transaction_hash, block = ?receipt.block_number, "Safe transaction mined");

        Ok(Execution::Executed(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
        }))
    }
}
