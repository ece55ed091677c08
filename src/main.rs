//! Main entry point for npass.

use clap::Parser;
use npass::cli::Cli;
use npass::utils::error_exit;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("NPASS_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("npass=debug")
        } else {
            EnvFilter::new("npass=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = cli.execute() {
        error_exit(&e.to_string(), 1);
    }
}
