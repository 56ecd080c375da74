mod cli;
mod config;
mod run;

use clap::Parser;
use tailor_logging::{tailor_info, LogDestination};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let destination = match (&config.log_file, cli.verbose) {
        (Some(path), true) => LogDestination::Both(path.clone()),
        (Some(path), false) => LogDestination::File(path.clone()),
        (None, _) => LogDestination::Terminal,
    };
    tailor_logging::initialize(&destination, tailor_logging::parse_level(&config.log_level));
    tailor_info!("tailor {} against {}", env!("CARGO_PKG_VERSION"), config.base_url);

    match &cli.command {
        Command::Run(args) => run::run_batch(&config, args).await,
        Command::Jobs => run::list_jobs(&config).await,
    }
}
