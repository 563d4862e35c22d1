//! pixelburn - burn-to-paint pixel canvas tools

use clap::Parser;
use tracing::info;

mod bridge;
mod cli;
mod commands;
mod logging;
mod submitter;

use cli::{Cli, Command};
use commands::render::RenderMode;
use commands::stats::LogStats;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = commands::load_config(cli.config.as_ref())?;
    info!("Canvas {0}x{0}", config.grid_size);

    match cli.command {
        Command::Render {
            log,
            out,
            prefix,
            heatmap,
        } => {
            let events = commands::load_event_log(config.grid_size, &log)?;
            let mode = if heatmap {
                RenderMode::Heatmap
            } else {
                RenderMode::Grid { prefix }
            };
            commands::render::run(&events, mode, &out)?;
        }
        Command::Session {
            script,
            out,
            fail_submissions,
            user,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let summary = runtime.block_on(commands::session::run_file(
                &config,
                &script,
                &out,
                &user,
                fail_submissions,
            ))?;
            info!(
                "Session wrote {} messages over {} frames",
                summary.messages, summary.frames
            );
        }
        Command::Stats { log, top } => {
            let events = commands::load_event_log(config.grid_size, &log)?;
            let stats = LogStats::collect(&events, top)?;
            stats.print(&mut std::io::stdout().lock())?;
        }
    }

    Ok(())
}
