use crate::chain::ChainReader;
use crate::engine::error::{Result, StrategyError};
use crate::engine::reserve::excess_reserve_ids;
use crate::engine::Strategy;
use crate::model::config::Config;
use crate::price::PriceSource;
use crate::run::executor::{Execution, TxExecutor};

/// Move excess from every over-target reserve pool into the LP account.
pub async fn run(
    chain: &dyn ChainReader,
    prices: &dyn PriceSource,
    executor: &dyn TxExecutor,
    config: &Config,
) -> Result<Execution> {
    let strategy = Strategy::new(chain, prices, config);

    let rebalance_amounts = strategy.rebalance_amounts().await?;
    let ids = excess_reserve_ids(&rebalance_amounts, &config.reserve_pools)?;
    if ids.is_empty() {
        return Err(StrategyError::nothing_to_do("No reserve pools hold excess"));
    }

    tracing::info!(?ids, "funding LP account from reserve pools");
    Ok(executor.execute(&strategy.fund_lp_account_tx(&ids)).await?)
}
