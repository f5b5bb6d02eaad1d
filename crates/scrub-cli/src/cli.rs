use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrub")]
#[command(about = "Redact vault files through the detect API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: per-user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a serverless invocation envelope
    Invoke {
        /// Envelope JSON file, or `-` for stdin
        #[arg(long, default_value = "-")]
        event: String,
    },

    /// Run the pipeline for one vault record
    Run {
        /// Vault record id (skyflow_id)
        #[arg(long)]
        record: String,

        /// Vault bearer token
        #[arg(long, env = "SCRUB_AUTH_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Serve invocations over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the default config file path
    Path,
}
