use alloy::primitives::{Address, I256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::model::position::PositionToken;

use super::ChainReader;

// ── Contract interfaces ──────────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IMetaPoolToken {
        function getRebalanceAmounts(uint256[] memory ids)
            external
            view
            returns (address[] memory pools, int256[] memory amounts);
        function fundLpAccount(uint256[] memory ids) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ITvlManager {
        function getAssetAllocation(string memory name) external view returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IAssetAllocation {
        struct TokenData {
            address token;
            string symbol;
            uint8 decimals;
        }

        function tokens() external view returns (TokenData[] memory);
        function balanceOf(address account, uint8 tokenIndex) external view returns (uint256);
        function NAME() external view returns (string memory);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ILpAccount {
        function zapNames() external view returns (string[] memory);
        function getLpTokenBalance(string memory name) external view returns (uint256);
        function claim(string[] memory names) external;
        function swap(string memory name, uint256 amount, uint256 minAmount) external;
        function deployStrategy(string memory name, uint256[] memory amounts) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IGnosisSafe {
        function nonce() external view returns (uint256);
        function isOwner(address owner) external view returns (bool);
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);
    }
}

// ── Provider factory ─────────────────────────────────────────────────

/// Read-only HTTP provider for `rpc_url`.
pub fn read_provider(rpc_url: &str) -> Result<DynProvider> {
    let url = rpc_url
        .parse()
        .with_context(|| format!("Invalid RPC URL '{rpc_url}'"))?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

// ── Chain reader ─────────────────────────────────────────────────────

/// [`ChainReader`] over a JSON-RPC provider.
#[derive(Clone)]
pub struct EvmChainReader {
    provider: DynProvider,
}

impl EvmChainReader {
    pub fn new(provider: DynProvider) -> Self {
        EvmChainReader { provider }
    }

    pub fn connect(rpc_url: &str) -> Result<Self> {
        Ok(EvmChainReader::new(read_provider(rpc_url)?))
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn decimals(&self, token: Address) -> Result<u8> {
        IERC20::new(token, &self.provider)
            .decimals()
            .call()
            .await
            .with_context(|| format!("{token}.decimals() call failed"))
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        IERC20::new(token, &self.provider)
            .balanceOf(account)
            .call()
            .await
            .with_context(|| format!("{token}.balanceOf({account}) call failed"))
    }

    async fn rebalance_amounts(
        &self,
        meta_pool_token: Address,
        ids: &[u64],
    ) -> Result<(Vec<Address>, Vec<I256>)> {
        let ids = ids.iter().map(|id| U256::from(*id)).collect();
        let result = IMetaPoolToken::new(meta_pool_token, &self.provider)
            .getRebalanceAmounts(ids)
            .call()
            .await
            .context("metaPoolToken.getRebalanceAmounts() call failed")?;
        Ok((result.pools, result.amounts))
    }

    async fn asset_allocation(&self, tvl_manager: Address, name: &str) -> Result<Address> {
        ITvlManager::new(tvl_manager, &self.provider)
            .getAssetAllocation(name.to_string())
            .call()
            .await
            .with_context(|| format!("tvlManager.getAssetAllocation({name}) call failed"))
    }

    async fn allocation_tokens(&self, allocation: Address) -> Result<Vec<PositionToken>> {
        let tokens = IAssetAllocation::new(allocation, &self.provider)
            .tokens()
            .call()
            .await
            .with_context(|| format!("{allocation}.tokens() call failed"))?;
        Ok(tokens
            .into_iter()
            .map(|t| PositionToken {
                token: t.token,
                decimals: t.decimals,
            })
            .collect())
    }

    async fn allocation_balance(&self, allocation: Address, account: Address, index: u8) -> Result<U256> {
        IAssetAllocation::new(allocation, &self.provider)
            .balanceOf(account, index)
            .call()
            .await
            .with_context(|| format!("{allocation}.balanceOf({account}, {index}) call failed"))
    }

    async fn allocation_name(&self, allocation: Address) -> Result<String> {
        IAssetAllocation::new(allocation, &self.provider)
            .NAME()
            .call()
            .await
            .with_context(|| format!("{allocation}.NAME() call failed"))
    }

    async fn zap_names(&self, lp_account: Address) -> Result<Vec<String>> {
        ILpAccount::new(lp_account, &self.provider)
            .zapNames()
            .call()
            .await
            .context("lpAccount.zapNames() call failed")
    }

    async fn lp_token_balance(&self, lp_account: Address, zap: &str) -> Result<U256> {
        ILpAccount::new(lp_account, &self.provider)
            .getLpTokenBalance(zap.to_string())
            .call()
            .await
            .with_context(|| format!("lpAccount.getLpTokenBalance({zap}) call failed"))
    }
}
