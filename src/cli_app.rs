//! Top-level CLI definition and dispatch.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use crate::core::config::Config;
use crate::core::errors::Result;

/// Media Log Warden — watches media-server logs and alerts operators.
#[derive(Parser)]
#[command(name = "mlw", version, about)]
pub struct Cli {
    /// Path to a TOML config file (defaults plus env overrides otherwise).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the monitor daemon in the foreground (used by systemd).
    Run,
    /// Show resolved configuration, host metrics, and media-server status.
    Status,
    /// Classify an existing log file once and summarize the matches.
    Check {
        /// Log file to scan.
        file: PathBuf,
    },
    /// Show or scaffold configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send a test alert through one configured channel.
    TestChannel {
        /// Channel id: email, discord, slack, or webhook.
        id: String,
    },
    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

/// `mlw config` subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration.
    Show,
    /// Write a default config file.
    Init {
        /// Destination path.
        #[arg(long, default_value = "mlw.toml")]
        path: PathBuf,
    },
}

/// Dispatch a parsed CLI invocation.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Run => {
            let config = Config::load(cli.config.as_deref())?;
            crate::daemon::run(config)
        }
        Command::Status => {
            let config = Config::load(cli.config.as_deref())?;
            crate::cli::status::run(&config, cli.json)
        }
        Command::Check { file } => {
            let config = Config::load(cli.config.as_deref())?;
            crate::cli::check::run(&config, file, cli.json)
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let config = Config::load(cli.config.as_deref())?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    println!("{}", config.to_toml()?);
                }
                Ok(())
            }
            ConfigAction::Init { path } => crate::cli::init_config(path),
        },
        Command::TestChannel { id } => {
            let config = Config::load(cli.config.as_deref())?;
            crate::cli::test_channel::run(&config, id, cli.json)
        }
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "mlw", &mut io::stdout());
            Ok(())
        }
    }
}
