use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{ControlCommand, OutputFormat};

mod commands;
pub use commands::*;

#[derive(Parser)]
#[command(name = "fifoplayer")]
#[command(about = "Bridge Spotify playback to named pipes for editors and status bars")]
#[command(version)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "FIFOPLAYER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authorize with Spotify, then publish the current track and listen for commands
    Run {
        /// Paste the redirect URL instead of catching it on a local listener
        #[arg(long)]
        manual: bool,
        /// Track pipe format: line or detailed
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Seconds between track updates
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Send a command to a running instance: play, pause or next
    Send {
        command: ControlCommand,
    },

    /// Print the next message published on the track pipe
    Status,
}
