//! Command-line interface (clap derive)

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pixelburn canvas tools.
///
/// Render the grid from a `PixelPlaced` log, drive a scripted session
/// against a local submitter, or summarise a log.
#[derive(Parser, Debug)]
#[command(name = "pixelburn", version, about = "Burn-to-paint pixel canvas tools")]
pub struct Cli {
    /// JSON config file; `PIXELBURN_*` environment variables override it
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the grid (or its heatmap) from a log to a PNG
    Render {
        /// `PixelPlaced` logs: decoded entries, raw `eth_getLogs` entries or a saved RPC response
        #[arg(long, value_name = "FILE")]
        log: PathBuf,

        /// Output PNG
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        /// Only replay the first N events
        #[arg(long, value_name = "N", conflicts_with = "heatmap")]
        prefix: Option<usize>,

        /// Render overwrite frequency instead of colors
        #[arg(long)]
        heatmap: bool,
    },

    /// Run a JSON script of host messages against a session
    Session {
        /// JSON array of script steps
        #[arg(long, value_name = "FILE")]
        script: PathBuf,

        /// Final frame as PNG
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        /// Answer every submission as failed
        #[arg(long)]
        fail_submissions: bool,

        /// Author recorded on locally confirmed pixels
        #[arg(long, default_value = "0x0000000000000000000000000000000000000001")]
        user: String,
    },

    /// Print totals and top authors for a log
    Stats {
        /// `PixelPlaced` logs: decoded entries, raw `eth_getLogs` entries or a saved RPC response
        #[arg(long, value_name = "FILE")]
        log: PathBuf,

        /// Number of authors to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}
