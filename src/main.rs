use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use todolite::cli::args::Cli;
use todolite::cli::commands;
use todolite::config::{ColorSetting, Config};

/// Environment variable controlling log verbosity.
const LOG_ENV: &str = "TODOLITE_LOG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {e:#}", "error".red().bold());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load()?;
    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let format = cli.output.unwrap_or(config.general.default_output);
    let output = commands::execute(cli.command, &config, format).await?;

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
