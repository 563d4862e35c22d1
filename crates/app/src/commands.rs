//! Subcommand implementations and the file loading they share

pub mod render;
pub mod session;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::Context;
use canvas::EventLog;
use pixelburn_config::CanvasConfig;
use pixelburn_ipc::{LogRecord, PixelPlacedLog};
use serde::Deserialize;
use tracing::info;

use crate::bridge::paint_event;

/// Config file (if given) with environment overrides applied on top
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CanvasConfig> {
    let Some(path) = path else {
        return Ok(CanvasConfig::from_env());
    };
    let mut config =
        CanvasConfig::load(path).with_context(|| format!("loading config {}", path.display()))?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// A log dump: a bare array, or a saved `eth_getLogs` JSON-RPC response
#[derive(Deserialize)]
#[serde(untagged)]
enum LogFile {
    List(Vec<LogRecord>),
    Rpc { result: Vec<LogRecord> },
}

/// Read `PixelPlaced` logs, either decoded or as node log entries
pub fn read_logs(path: &Path) -> anyhow::Result<Vec<PixelPlacedLog>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading log file {}", path.display()))?;
    let records = match serde_json::from_str::<LogFile>(&raw)
        .with_context(|| format!("parsing log file {}", path.display()))?
    {
        LogFile::List(records) | LogFile::Rpc { result: records } => records,
    };
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .into_pixel_placed()
                .with_context(|| format!("log entry {}", index))
        })
        .collect()
}

/// Decode logs into a gap-checked event log.
///
/// Unnumbered logs take their position in the file as sequence.
pub fn build_event_log(side: u32, logs: &[PixelPlacedLog]) -> anyhow::Result<EventLog> {
    let mut log = EventLog::new(side);
    for (index, raw) in logs.iter().enumerate() {
        let event = paint_event(raw, index as u64).with_context(|| format!("log entry {}", index))?;
        log.append(event)
            .with_context(|| format!("log entry {}", index))?;
    }
    info!("Loaded {} paint events", log.len());
    Ok(log)
}

pub fn load_event_log(side: u32, path: &Path) -> anyhow::Result<EventLog> {
    build_event_log(side, &read_logs(path)?)
}
