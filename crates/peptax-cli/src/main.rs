//! Peptax CLI - Main entry point

use clap::Parser;
use peptax_cli::{Cli, Commands, ConfigCommand};
use peptax_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Values from a local .env are picked up like any other environment variable
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("peptax")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> peptax_cli::Result<()> {
    let config = cli.load_config()?;

    match &cli.command {
        Commands::Annotate(args) => peptax_cli::commands::annotate::run(&args.apply(config)).await,

        Commands::Prepare {
            input_dir,
            output_dir,
            thresholds,
        } => {
            let output_dir = output_dir.as_ref().unwrap_or(&config.input_dir);
            let thresholds = if thresholds.is_empty() {
                &config.q_value_thresholds
            } else {
                thresholds
            };
            peptax_cli::commands::prepare::run(input_dir, output_dir, thresholds)
        },

        Commands::Frequencies {
            input_dir,
            output,
            genera,
        } => {
            let input_dir = input_dir.as_ref().unwrap_or(&config.output_dir);
            let genera = if genera.is_empty() { &config.genera } else { genera };
            peptax_cli::commands::frequencies::run(input_dir, output, genera)
        },

        Commands::Config { command } => match command {
            ConfigCommand::Show => peptax_cli::commands::config::show(&config),
        },
    }
}
