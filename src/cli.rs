use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LP account autotasks: harvest rewards, move excess reserves, deploy
/// liquidity, and watch Curve pools for depegs.
#[derive(Parser)]
#[command(name = "lp-autotasks", version, about)]
pub struct Cli {
    /// Path to the autotask config JSON file
    #[arg(long, global = true, default_value = "autotasks.json")]
    pub config: PathBuf,

    /// Build and log transactions without submitting them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Claim rewards for every funded zap and swap them to USDC
    Harvest,

    /// Fund the LP account from reserve pools holding excess
    DeployExcessReserves,

    /// Deploy idle underlyer into the position furthest below target
    AddLiquidity,

    /// Filter sentinel matches to Curve pools with a depegged token
    DepegSentinel {
        /// Sentinel payload JSON file (default: stdin)
        #[arg(long)]
        payload: Option<PathBuf>,
    },

    /// Print position values, NAV, targets and deltas
    Positions,

    /// Validate the config file
    ValidateConfig,

    /// Output the JSON schema for the config file
    Schema,

    /// Output an example config JSON to stdout
    Example,
}
