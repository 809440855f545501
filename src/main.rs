//! Binary entry point for `mlw`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use media_log_warden::cli_app::{Cli, run};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
