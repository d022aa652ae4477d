//! CLI module for fleetwatch
//!
//! # Commands
//!
//! - `serve` - Start the dashboard server
//! - `check` - Probe every configured service once
//! - `diagnose` - Probe and diagnose one machine
//! - `unlock` - Obtain a session from a running dashboard via observer approval
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! fleetwatch serve
//!
//! # What is wrong with JL2?
//! fleetwatch diagnose JL2
//!
//! # Generate shell completions
//! fleetwatch completions bash > ~/.bash_completion.d/fleetwatch
//! ```

pub mod check;
pub mod completions;
pub mod config;
pub mod diagnose;
pub mod output;
pub mod serve;
pub mod unlock;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::FleetwatchConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// fleetwatch - Fleet liveness dashboard
#[derive(Parser, Debug)]
#[command(
    name = "fleetwatch",
    version,
    about = "Liveness, diagnosis and approval-gated access for a small compute fleet"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(ServeArgs),
    /// Probe every configured service once
    Check(CheckArgs),
    /// Probe one machine and explain what is wrong with it
    Diagnose(DiagnoseArgs),
    /// Request access to a running dashboard through the observer
    Unlock(UnlockArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "fleetwatch.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "FLEETWATCH_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "FLEETWATCH_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FLEETWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Do not relay the live event feed
    #[arg(long)]
    pub no_feed: bool,

    /// Serve protected routes without a session
    #[arg(long)]
    pub no_auth: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "fleetwatch.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Machine id, e.g. JL1
    pub machine: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "fleetwatch.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct UnlockArgs {
    /// Base URL of the running dashboard
    #[arg(short, long, default_value = "http://localhost:8080", env = "FLEETWATCH_URL")]
    pub url: String,

    /// Poll cadence in milliseconds [default: auth.poll_interval_ms]
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Path to configuration file
    #[arg(short, long, default_value = "fleetwatch.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "fleetwatch.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load `path` if it exists (defaults otherwise), apply env overrides and
/// validate.
pub fn load_config(path: &Path) -> Result<FleetwatchConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        FleetwatchConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        FleetwatchConfig::default()
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
