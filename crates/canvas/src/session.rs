//! Per-session canvas state
//!
//! [`CanvasSession`] owns everything one connected user interacts with: the
//! raster, the viewport, staged and in-flight edits, the event log with its
//! heatmap, the overlay selection and the render queue. It is created when a
//! session starts and [`CanvasSession::reset`] on disconnect.
//!
//! Handlers live in submodules by concern:
//! - `input` - pointer and wheel samples, hover
//! - `submission` - commit, cancel and submission outcomes
//! - `import` - staging an image into the grid

mod import;
mod input;
mod submission;

use pixelburn_config::{CanvasConfig, MAX_GRID_SIZE};
use tracing::{debug, info};

use crate::log::{EventLog, Heatmap, PaintEvent};
use crate::overlay::{OverlayMode, OverlayState};
use crate::pending::{CommittedBatch, PendingEdits};
use crate::raster::RasterStore;
use crate::render::{DisplaySurface, RenderQueue};
use crate::stroke::StrokeTracker;
use crate::types::{CellCoord, Palette, Rgba};
use crate::validation::CanvasError;
use crate::viewport::Viewport;

pub use input::{PointerButton, PointerPhase, PointerSample, HOVER_PLACEHOLDER};
pub use submission::SubmissionResult;

/// What the pointer is currently doing between down and up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PointerMode {
    #[default]
    Idle,
    Painting,
    Panning,
}

#[derive(Debug)]
pub struct CanvasSession {
    config: CanvasConfig,
    raster: RasterStore,
    viewport: Viewport,
    pending: PendingEdits,
    in_flight: Option<CommittedBatch>,
    stroke: StrokeTracker,
    log: EventLog,
    heatmap: Heatmap,
    overlay: OverlayState,
    render_queue: RenderQueue,
    palette: Palette,
    selected: Rgba,
    hover: Option<CellCoord>,
    pointer: PointerMode,
    /// Already staged cell the current stroke started on, while the
    /// pointer has not left it
    press: Option<CellCoord>,
}

impl CanvasSession {
    /// Start a session from a config.
    ///
    /// Fails if the grid side is zero or too large, or the palette contains
    /// an invalid color.
    pub fn new(config: &CanvasConfig) -> Result<Self, CanvasError> {
        let side = config.grid_size;
        if side == 0 || side > MAX_GRID_SIZE {
            return Err(CanvasError::InvalidGridSize(side));
        }
        let palette = if config.palette.is_empty() {
            Palette::default()
        } else {
            Palette::parse(&config.palette)?
        };

        let mut render_queue = RenderQueue::new();
        render_queue.request();

        info!(
            "Canvas session started: {}x{} grid, {} palette colors",
            side,
            side,
            palette.len()
        );

        Ok(Self {
            config: config.clone(),
            raster: RasterStore::with_tile_size(side, config.tile_size),
            viewport: Viewport::from_config(config),
            pending: PendingEdits::new(side),
            in_flight: None,
            stroke: StrokeTracker::new(side),
            log: EventLog::new(side),
            heatmap: Heatmap::new(side),
            overlay: OverlayState::new(side),
            render_queue,
            palette,
            selected: Rgba::WHITE,
            hover: None,
            pointer: PointerMode::Idle,
            press: None,
        })
    }

    /// Drop all session state (disconnect). Log listeners are kept.
    pub fn reset(&mut self) {
        let side = self.config.grid_size;
        self.raster.reset();
        self.viewport = Viewport::from_config(&self.config);
        self.pending = PendingEdits::new(side);
        self.in_flight = None;
        self.stroke.end();
        self.log.clear();
        self.heatmap.clear();
        self.overlay.reset(side);
        self.selected = Rgba::WHITE;
        self.hover = None;
        self.pointer = PointerMode::Idle;
        self.press = None;
        self.render_queue.request();
        info!("Canvas session reset");
    }

    /// Apply one authoritative paint event.
    ///
    /// The event is appended to the log and counted in the heatmap. If the
    /// cell is staged or in flight locally the optimistic color stays on
    /// screen and only the remembered original is replaced, so a later
    /// cancel or failed submission restores the authoritative color.
    pub fn ingest(&mut self, event: PaintEvent) -> Result<(), CanvasError> {
        let cell = event.cell();
        let color = event.color;
        self.log.append(event)?;
        if let Some(event) = self.log.events().last() {
            self.heatmap.record_event(event);
        }

        let staged = self.pending.rebase_original(cell, color);
        let in_flight = self
            .in_flight
            .as_mut()
            .is_some_and(|batch| batch.rebase_original(cell, color));
        if staged || in_flight {
            debug!(
                "Event on locally edited cell ({}, {}): original rebased",
                cell.x, cell.y
            );
        } else {
            self.raster.set_cell(cell.x, cell.y, color);
        }

        if !matches!(self.overlay.mode(), OverlayMode::Replay { .. }) {
            self.render_queue.request();
        }
        Ok(())
    }

    /// Register a callback for every ingested event
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: Fn(&PaintEvent) + 'static,
    {
        self.log.listen(listener);
    }

    /// Upload the overlay's buffer if a redraw was requested.
    ///
    /// Returns whether a frame was taken. Any number of changes since the
    /// previous frame result in a single upload.
    pub fn frame<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, CanvasError> {
        if !self.render_queue.take_frame() {
            return Ok(false);
        }
        self.overlay
            .present(&mut self.raster, &self.log, &self.heatmap, surface)?;
        Ok(true)
    }

    /// Queue a redraw (e.g. after the host resized the surface)
    pub fn request_redraw(&mut self) -> bool {
        self.render_queue.request()
    }

    /// Change the on-screen viewport size
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.viewport.resize(width_px, height_px);
        self.render_queue.request();
    }

    /// Color used for new staged cells
    pub fn select_color(&mut self, color: Rgba) {
        self.selected = color.with_opaque_alpha();
        debug!("Selected color {}", self.selected.to_hex());
    }

    /// Select a palette swatch by index; returns false for unknown indices
    pub fn select_palette_index(&mut self, index: usize) -> bool {
        match self.palette.get(index) {
            Some(color) => {
                self.select_color(color);
                true
            }
            None => false,
        }
    }

    pub fn set_overlay(&mut self, mode: OverlayMode) -> Result<(), CanvasError> {
        if let OverlayMode::Replay { prefix } = mode {
            self.log.prefix(prefix)?;
        }
        if self.overlay.set_mode(mode) {
            self.render_queue.request();
        }
        Ok(())
    }

    /// Switch between heatmap and live view
    pub fn toggle_heatmap(&mut self) -> OverlayMode {
        let mode = self.overlay.mode().toggled_heatmap();
        if self.overlay.set_mode(mode) {
            self.render_queue.request();
        }
        mode
    }

    /// Show the grid after the first `prefix` events
    pub fn set_replay_prefix(&mut self, prefix: usize) -> Result<(), CanvasError> {
        self.set_overlay(OverlayMode::Replay { prefix })
    }

    #[inline]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    #[inline]
    pub fn side(&self) -> u32 {
        self.raster.side()
    }

    #[inline]
    pub fn raster(&self) -> &RasterStore {
        &self.raster
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn pending(&self) -> &PendingEdits {
        &self.pending
    }

    #[inline]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    #[inline]
    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }

    #[inline]
    pub fn overlay(&self) -> OverlayMode {
        self.overlay.mode()
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn selected_color(&self) -> Rgba {
        self.selected
    }

    #[inline]
    pub fn needs_frame(&self) -> bool {
        self.render_queue.is_queued()
    }

    /// Frames actually presented so far
    #[inline]
    pub fn frames(&self) -> u64 {
        self.render_queue.frames()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::raster::TileCoord;

    /// 8x8 grid shown 1:1 in an 8x8 viewport, so screen == grid
    pub fn session(side: u32) -> CanvasSession {
        let mut config = CanvasConfig::with_grid_size(side);
        config.viewport_width = side;
        config.viewport_height = side;
        CanvasSession::new(&config).unwrap()
    }

    #[derive(Default)]
    pub struct SpySurface {
        pub uploads: usize,
        pub last: Vec<u8>,
        pub last_dirty: Vec<TileCoord>,
    }

    impl DisplaySurface for SpySurface {
        fn upload(&mut self, rgba: &[u8], _side: u32, dirty: &[TileCoord]) {
            self.uploads += 1;
            self.last = rgba.to_vec();
            self.last_dirty = dirty.to_vec();
        }
    }
}
