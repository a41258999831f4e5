use crate::domain::catalog::{RingColor, RingSize};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "halo-site")]
#[command(about = "Headless host for the HALO marketing site components")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to ./halo.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load community discussions and counters
    Community {
        /// Override the number of posts to fetch
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run the particle background headlessly and report what it drew
    Particles {
        #[arg(long, default_value = "1440")]
        width: f64,

        #[arg(long, default_value = "900")]
        height: f64,

        #[arg(long, default_value = "black")]
        color: RingColor,

        /// Run time in milliseconds
        #[arg(long, default_value = "2000")]
        duration_ms: u64,
    },

    /// Print simulated heart rate and stress readings
    Vitals {
        #[arg(long, default_value = "10")]
        seconds: u64,
    },

    /// Create a pre-order for the selected color and size
    Order {
        #[arg(long, default_value = "black")]
        color: RingColor,

        /// US ring size, e.g. "8" or "US 8"
        #[arg(long)]
        size: Option<RingSize>,
    },
}
