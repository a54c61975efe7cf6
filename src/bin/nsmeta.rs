//! nsmeta CLI Binary
//!
//! Command-line interface for a partitioned namespace store.

use anyhow::Context;
use clap::Parser;
use nsmeta::config::ConfigLoader;
use nsmeta::logging::init_logging;
use nsmeta::tooling::cli::{Cli, CliContext, Commands};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let logging = cli.logging_config(&config.logging);
    init_logging(Some(&logging)).context("Failed to initialize logging")?;

    if let Commands::Config = cli.command {
        return Ok(ConfigLoader::to_toml(&config)?);
    }

    let context = CliContext::open(config, cli.store.clone()).context("Failed to open store")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
