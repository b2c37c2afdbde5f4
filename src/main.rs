use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use lp_autotasks::engine::StrategyError;
use lp_autotasks::{example, run, schema, validate};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let run_config = run::RunConfig {
        config_path: cli.config.clone(),
        dry_run: cli.dry_run,
    };

    let result = match cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::Example => example::run(),
        cli::Command::ValidateConfig => validate::run(&cli.config),
        cli::Command::Harvest => run::run(run::Job::Harvest, &run_config),
        cli::Command::DeployExcessReserves => run::run(run::Job::DeployExcessReserves, &run_config),
        cli::Command::AddLiquidity => run::run(run::Job::AddLiquidity, &run_config),
        cli::Command::DepegSentinel { payload } => {
            run::run(run::Job::DepegSentinel { payload }, &run_config)
        }
        cli::Command::Positions => run::run(run::Job::Positions, &run_config),
    };

    match result {
        Err(e) if is_nothing_to_do(&e) => {
            tracing::info!("nothing to do: {e:#}");
            Ok(())
        }
        other => other,
    }
}

fn is_nothing_to_do(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StrategyError>()
        .is_some_and(StrategyError::is_nothing_to_do)
}
