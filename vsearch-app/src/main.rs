mod app;
mod cli;
mod link;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = args.experiment_config()?;
    info!(
        trials = config.planned_trials(),
        seed = ?config.seed,
        windowed = args.windowed,
        "configuration loaded"
    );

    app::run(config, args.windowed)
}
