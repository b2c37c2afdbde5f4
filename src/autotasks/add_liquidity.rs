use crate::chain::ChainReader;
use crate::engine::error::Result;
use crate::engine::Strategy;
use crate::model::config::Config;
use crate::price::PriceSource;
use crate::run::executor::{Execution, TxExecutor};

/// Deploy idle underlyer into the position furthest below target.
pub async fn run(
    chain: &dyn ChainReader,
    prices: &dyn PriceSource,
    executor: &dyn TxExecutor,
    config: &Config,
) -> Result<Execution> {
    let tx = Strategy::new(chain, prices, config).next_add_liquidity_tx().await?;
    Ok(executor.execute(&tx).await?)
}
