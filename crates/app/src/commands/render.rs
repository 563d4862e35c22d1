//! `render`: log to PNG, optionally as a heatmap or a replay prefix

use std::path::Path;

use anyhow::Context;
use canvas::{reconstruct, DisplaySurface, EventLog, Heatmap};
use image::RgbaImage;
use tracing::info;

/// What to draw from the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Grid after the first `prefix` events (all when `None`)
    Grid { prefix: Option<usize> },
    Heatmap,
}

pub fn render_image(log: &EventLog, mode: RenderMode) -> anyhow::Result<RgbaImage> {
    let side = log.side();
    let mut image = RgbaImage::new(side, side);
    match mode {
        RenderMode::Heatmap => {
            let heatmap = Heatmap::from_log(log);
            info!("Heatmap max overwrite count: {}", heatmap.max());
            image.upload(&heatmap.render(), side, &[]);
        }
        RenderMode::Grid { prefix } => {
            let k = prefix.unwrap_or(log.len());
            let mut raster = reconstruct(log, k)?;
            raster.sync_to_display(&mut image);
            info!("Replayed {} of {} events", k, log.len());
        }
    }
    Ok(image)
}

pub fn run(log: &EventLog, mode: RenderMode, out: &Path) -> anyhow::Result<()> {
    let image = render_image(log, mode)?;
    image
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("Wrote {}x{} image to {}", image.width(), image.height(), out.display());
    Ok(())
}
