use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `steam-link-relay` - collects Steam store links shared on Discord into one channel.
#[derive(Parser, Debug)]
#[command(name = "steam-link-relay")]
#[command(version)]
#[command(about = "Relay Steam store links from Discord into a single channel.", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ~/.steam-link-relay/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Connect to Discord and relay links (default)
    Run,

    /// Show the effective configuration
    Status,

    /// Validate a single store link against the catalog
    Check {
        /// Store link, e.g. https://store.steampowered.com/app/570/Dota_2/
        url: String,
    },

    /// Print the store links found in a piece of text
    Extract {
        /// Text to scan
        text: String,
    },
}
