//! Which buffer the display surface shows: live grid, heatmap or replay

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::log::{EventLog, Heatmap, ReplayCursor};
use crate::raster::RasterStore;
use crate::render::DisplaySurface;
use crate::validation::CanvasError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayMode {
    /// The authoritative grid plus local staged edits
    #[default]
    Live,
    /// Per-cell overwrite counts
    Heatmap,
    /// The grid after the first `prefix` log events
    Replay { prefix: usize },
}

impl OverlayMode {
    /// Heatmap toggles back to live; anything else switches to heatmap
    pub fn toggled_heatmap(self) -> Self {
        match self {
            OverlayMode::Heatmap => OverlayMode::Live,
            _ => OverlayMode::Heatmap,
        }
    }

    #[inline]
    pub fn is_live(self) -> bool {
        self == OverlayMode::Live
    }
}

/// Overlay selection plus the scratch buffers the non-live modes render into.
///
/// Changing mode never touches the live raster. The next present after a
/// change uploads the whole new buffer.
#[derive(Debug)]
pub struct OverlayState {
    mode: OverlayMode,
    stale: bool,
    cursor: ReplayCursor,
    heat_buffer: Vec<u8>,
}

impl OverlayState {
    pub fn new(side: u32) -> Self {
        Self {
            mode: OverlayMode::Live,
            stale: false,
            cursor: ReplayCursor::new(side),
            heat_buffer: Vec::new(),
        }
    }

    #[inline]
    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    /// Switch mode; returns whether it changed
    pub fn set_mode(&mut self, mode: OverlayMode) -> bool {
        if self.mode == mode {
            return false;
        }
        debug!("overlay {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.stale = true;
        true
    }

    /// Upload the buffer for the current mode.
    ///
    /// Returns whether the surface received anything.
    pub fn present<S: DisplaySurface + ?Sized>(
        &mut self,
        raster: &mut RasterStore,
        log: &EventLog,
        heatmap: &Heatmap,
        surface: &mut S,
    ) -> Result<bool, CanvasError> {
        let stale = std::mem::take(&mut self.stale);
        match self.mode {
            OverlayMode::Live => {
                if stale {
                    raster.mark_all_dirty();
                }
                Ok(raster.sync_to_display(surface))
            }
            OverlayMode::Heatmap => {
                let len = heatmap.side() as usize * heatmap.side() as usize * crate::CHANNELS;
                self.heat_buffer.resize(len, 0);
                heatmap.render_into(&mut self.heat_buffer);
                surface.upload(&self.heat_buffer, heatmap.side(), &[]);
                Ok(true)
            }
            OverlayMode::Replay { prefix } => {
                let replay = match self.cursor.seek(log, prefix) {
                    Ok(replay) => replay,
                    Err(e) => {
                        // Keep the flag so a later valid prefix still uploads in full
                        self.stale = stale;
                        return Err(e);
                    }
                };
                if stale {
                    replay.mark_all_dirty();
                }
                Ok(replay.sync_to_display(surface))
            }
        }
    }

    /// Back to live with empty scratch buffers
    pub fn reset(&mut self, side: u32) {
        self.mode = OverlayMode::Live;
        self.stale = true;
        self.cursor = ReplayCursor::new(side);
        self.heat_buffer.clear();
    }
}
