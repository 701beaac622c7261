//! fillscan - classify form fields and score forms for autofill

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use fillscan::cli::{Cli, Commands};
use fillscan::error::Result;

mod commands;
mod utils;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("{} {}", "hint:".yellow(), hint);
        }
        std::process::exit(1);
    }
}

/// Log to stderr. RUST_LOG wins; otherwise `--verbose` selects debug output.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "fillscan=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan { file, url, json } => commands::cmd_scan(&file, &url, json),
        Commands::Classify { file, selector, list, json } => {
            commands::cmd_classify(&file, &selector, &list, json)
        }
        Commands::Analyze { file, selector, url, json } => {
            commands::cmd_analyze(&file, &selector, &url, json)
        }
        Commands::Expiry { placeholder, label, month, year } => {
            commands::cmd_expiry(placeholder, label, month, year)
        }
        Commands::Rules { init, path } => commands::cmd_rules(init, path),
    }
}
