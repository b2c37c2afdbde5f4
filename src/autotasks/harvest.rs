use alloy::primitives::{Address, I256, U256};
use futures::future::join_all;

use crate::chain::evm::ILpAccount;
use crate::chain::{ChainReader, TxRequest};
use crate::engine::error::{Result, StrategyError, ensure_same_len};
use crate::engine::normalize::{ten_pow, to_signed, to_unsigned};
use crate::engine::swap::swap_min_amount;
use crate::model::amount::{USD_DECIMALS, format_amount};
use crate::model::config::{Config, SwapConfig};
use crate::price::PriceSource;
use crate::run::executor::{Execution, TxExecutor};

/// Executions of one harvest run.
#[derive(Debug)]
pub struct HarvestOutcome {
    pub claim: Execution,
    /// Swap key and execution, for every swap whose transaction was built.
    pub swaps: Vec<(String, Execution)>,
}

/// LP token balance per zap. A failed read counts as zero.
pub async fn lp_balances(chain: &dyn ChainReader, lp_account: Address, zaps: &[String]) -> Vec<U256> {
    join_all(zaps.iter().map(|zap| async move {
        match chain.lp_token_balance(lp_account, zap).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(zap = %zap, error = %format!("{e:#}"), "LP balance read failed, treating as zero");
                U256::ZERO
            }
        }
    }))
    .await
}

/// Zaps holding LP tokens, in zap order.
pub fn claim_names(zaps: &[String], balances: &[U256]) -> Result<Vec<String>> {
    ensure_same_len("claim names vs LP balances", zaps.len(), balances.len())?;
    Ok(zaps
        .iter()
        .zip(balances)
        .filter(|(_, balance)| **balance > U256::ZERO)
        .map(|(zap, _)| zap.clone())
        .collect())
}

/// `claim` on the LP account for every zap with a position.
pub async fn create_claim_tx(chain: &dyn ChainReader, config: &Config) -> Result<TxRequest> {
    let zaps = chain.zap_names(config.lp_account).await?;
    let balances = lp_balances(chain, config.lp_account, &zaps).await;
    let names = claim_names(&zaps, &balances)?;
    tracing::info!(claims = ?names, "claiming rewards");

    Ok(TxRequest::call(
        config.lp_account,
        &ILpAccount::claimCall { names },
    ))
}

/// `swap` selling the LP account's whole balance of the swap's reward token.
///
/// Fails with a nothing-to-do error when there is no balance or the output
/// would be worth less than the configured minimum.
pub async fn create_swap_tx(
    chain: &dyn ChainReader,
    prices: &dyn PriceSource,
    config: &Config,
    swap: &SwapConfig,
) -> Result<TxRequest> {
    let amount = to_signed(chain.balance_of(swap.token, config.lp_account).await?)?;
    if amount < I256::ONE {
        return Err(StrategyError::nothing_to_do(format!(
            "No {} reward tokens available for swap",
            swap.key
        )));
    }

    let min_amount = swap_min_amount(swap, amount, prices).await?;

    // `min_swap_usd` expressed in output token units, 1 output token = 1 USD.
    let floor = config
        .sizing
        .min_swap_usd
        .checked_mul(ten_pow(swap.out_token_decimals)?)
        .ok_or(StrategyError::Overflow("minimum swap value"))?
        / ten_pow(USD_DECIMALS)?;
    if min_amount < floor {
        return Err(StrategyError::nothing_to_do(format!(
            "USD value of {} reward tokens is too low: ${}",
            swap.key,
            format_amount(min_amount, swap.out_token_decimals)
        )));
    }

    tracing::info!(
        swap = %swap.name,
        amount = %format_amount(amount, swap.in_token_decimals),
        min_amount = %format_amount(min_amount, swap.out_token_decimals),
        "swapping rewards"
    );
    Ok(TxRequest::call(
        config.lp_account,
        &ILpAccount::swapCall {
            name: swap.name.clone(),
            amount: to_unsigned(amount, "Swap amount")?,
            minAmount: to_unsigned(min_amount, "Minimum amount")?,
        },
    ))
}

/// Build every configured swap concurrently; those that cannot be built are
/// logged and skipped, execution failures propagate.
pub async fn swap_with_safe(
    chain: &dyn ChainReader,
    prices: &dyn PriceSource,
    executor: &dyn TxExecutor,
    config: &Config,
) -> Result<Vec<(String, Execution)>> {
    let built = join_all(
        config
            .swaps
            .iter()
            .map(|swap| async move { (swap, create_swap_tx(chain, prices, config, swap).await) }),
    )
    .await;

    let mut executions = Vec::new();
    for (swap, tx) in built {
        match tx {
            Ok(tx) => executions.push((swap.key.clone(), executor.execute(&tx).await?)),
            Err(e) => tracing::warn!(swap = %swap.key, error = %e.root(), "skipping swap"),
        }
    }
    Ok(executions)
}

/// Claim rewards for every funded zap, then sell them.
pub async fn run(
    chain: &dyn ChainReader,
    prices: &dyn PriceSource,
    executor: &dyn TxExecutor,
    config: &Config,
) -> Result<HarvestOutcome> {
    let claim_tx = create_claim_tx(chain, config).await?;
    let claim = executor.execute(&claim_tx).await?;
    let swaps = swap_with_safe(chain, prices, executor, config).await?;
    Ok(HarvestOutcome { claim, swaps })
}
