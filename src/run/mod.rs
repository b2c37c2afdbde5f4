pub mod config;
pub mod executor;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::autotasks::{add_liquidity, deploy_excess_reserves, depeg_sentinel, harvest, positions};
use crate::chain::evm::EvmChainReader;
use crate::model::config::Config;
use crate::price::coingecko::CoinGecko;

use config::RuntimeConfig;
use executor::dry_run::DryRunExecutor;
use executor::safe::SafeExecutor;
use executor::{Execution, TxExecutor};

/// CLI-facing config struct (before env var resolution).
pub struct RunConfig {
    pub config_path: PathBuf,
    pub dry_run: bool,
}

/// A job the CLI can run.
pub enum Job {
    Harvest,
    DeployExcessReserves,
    AddLiquidity,
    DepegSentinel { payload: Option<PathBuf> },
    Positions,
}

impl Job {
    fn name(&self) -> &'static str {
        match self {
            Job::Harvest => "harvest",
            Job::DeployExcessReserves => "deploy-excess-reserves",
            Job::AddLiquidity => "add-liquidity",
            Job::DepegSentinel { .. } => "depeg-sentinel",
            Job::Positions => "positions",
        }
    }
}

/// Entry point for every job subcommand.
pub fn run(job: Job, cli_config: &RunConfig) -> Result<()> {
    let config = load_config(&cli_config.config_path)?;
    let runtime = RuntimeConfig::from_env(cli_config.dry_run)?;

    tracing::info!(
        job = job.name(),
        config = %cli_config.config_path.display(),
        dry_run = runtime.dry_run,
        signer = ?runtime.signer_address(),
        "starting autotask"
    );

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(run_async(job, config, runtime))
}

fn load_config(path: &Path) -> Result<Config> {
    crate::validate::load_config(path).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::anyhow!("Config validation failed:\n  {}", msgs.join("\n  "))
    })
}

async fn run_async(job: Job, config: Config, runtime: RuntimeConfig) -> Result<()> {
    let prices = CoinGecko::new(&runtime.coingecko_url);

    if let Job::DepegSentinel { payload } = &job {
        let payload = read_payload(payload.as_deref())?;
        let response = depeg_sentinel::run(&payload, &prices, &config).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let chain = EvmChainReader::connect(runtime.rpc_url()?)?;

    if let Job::Positions = job {
        positions::run(&chain, &prices, &config).await?.print();
        return Ok(());
    }

    let executor = build_executor(&runtime, &config)?;
    match job {
        Job::Harvest => {
            let outcome = harvest::run(&chain, &prices, executor.as_ref(), &config).await?;
            report("claim", &outcome.claim);
            for (swap, execution) in &outcome.swaps {
                report(swap, execution);
            }
        }
        Job::DeployExcessReserves => {
            let execution = deploy_excess_reserves::run(&chain, &prices, executor.as_ref(), &config).await?;
            report("fundLpAccount", &execution);
        }
        Job::AddLiquidity => {
            let execution = add_liquidity::run(&chain, &prices, executor.as_ref(), &config).await?;
            report("deployStrategy", &execution);
        }
        Job::DepegSentinel { .. } | Job::Positions => {}
    }
    Ok(())
}

fn build_executor(runtime: &RuntimeConfig, config: &Config) -> Result<Box<dyn TxExecutor>> {
    if runtime.dry_run {
        return Ok(Box::new(DryRunExecutor));
    }
    let signer = runtime
        .signer()?
        .cloned()
        .context("a signer is required outside dry-run mode")?;
    Ok(Box::new(SafeExecutor::new(runtime.rpc_url()?, signer, config.lp_safe)?))
}

fn read_payload(path: Option<&Path>) -> Result<depeg_sentinel::SentinelPayload> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading sentinel payload {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading sentinel payload from stdin")?;
            buf
        }
    };
    serde_json::from_str(&contents).context("parsing sentinel payload")
}

fn report(what: &str, execution: &Execution) {
    match execution {
        Execution::Executed(receipt) => tracing::info!(
            tx = what,
            hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "executed"
        ),
        Execution::NotSubmitted => tracing::info!(tx = what, "not submitted"),
    }
}
