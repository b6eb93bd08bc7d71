//! Cascade CLI Binary
//!
//! Harness for running reconciliation scenarios against the renderer.

use anyhow::Context;
use cascade::cli::{Cli, RunContext};
use cascade::config::CascadeConfig;
use cascade::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&build_logging_config(&cli, &config))) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Cascade CLI starting");

    match run(cli, config) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CascadeConfig> {
    CascadeConfig::load(cli.config.as_deref()).context("Failed to load configuration")
}

fn run(cli: Cli, config: CascadeConfig) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start runtime")?;
    let context = RunContext::new(config);
    let output = runtime.block_on(context.execute(&cli.command))?;
    println!("{}", output.text);
    info!(success = output.success, "Command completed");
    Ok(output.success)
}

/// Build logging configuration from CLI args over the loaded configuration
fn build_logging_config(cli: &Cli, config: &CascadeConfig) -> LoggingConfig {
    if !cli.verbose && cli.log_level.is_none() {
        let mut logging = LoggingConfig::default();
        logging.level = "off".to_string();
        return logging;
    }

    let mut logging = config.logging.clone();
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        logging.file = file.clone();
    }
    logging
}
