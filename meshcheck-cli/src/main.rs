//! meshcheck -- service mesh integration scenario runner.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            use colored::Colorize;
            eprintln!("{} {e:#}", "error:".red().bold());
            e.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let writer = OutputWriter::new(cli.output);

    // `config` reports its own load errors
    if let Commands::Config(args) = cli.command {
        commands::config::execute(args, &cli.config, &writer).await?;
        return Ok(());
    }

    let mut loaded = commands::load_config(&cli.config).await?;
    if let Some(level) = cli.log_level {
        loaded.config.general.log_level = level;
    }
    logging::init_tracing(&loaded.config.general)?;
    meshcheck_core::metrics::describe_all();

    match &loaded.source {
        Some(path) => tracing::info!(config = %path.display(), "meshcheck starting"),
        None => tracing::info!(
            config = %cli.config.display(),
            "config file not found, using defaults"
        ),
    }

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &loaded.config, &writer).await?,
        Commands::Check(args) => commands::check::execute(args, &loaded.config, &writer).await?,
        Commands::Steps => commands::steps::execute(&writer)?,
        Commands::Config(_) => {}
    }

    Ok(())
}
