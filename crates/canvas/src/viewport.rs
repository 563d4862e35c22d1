//! Viewport transform: pan, zoom-to-cursor and screen/grid mapping
//!
//! The viewport is the window through which part of the grid is shown.
//! `origin` is the grid-space point at the top-left screen pixel and `zoom`
//! is the number of screen pixels per cell, so
//! `grid = origin + screen / zoom`.

use pixelburn_config::{CanvasConfig, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use tracing::debug;

use crate::constants::{GRID_LINE_MIN_ZOOM, WHEEL_ZOOM_STEP};
use crate::validation::in_grid;

/// Anchor captured when a pan drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    screen_x: f64,
    screen_y: f64,
    origin_x: f64,
    origin_y: f64,
}

/// Source and destination rectangles for a scaled blit of the raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitRect {
    /// Source rectangle in cells
    pub src_x: u32,
    pub src_y: u32,
    pub src_w: u32,
    pub src_h: u32,
    /// Destination rectangle in screen pixels
    pub dst_x: f64,
    pub dst_y: f64,
    pub dst_w: f64,
    pub dst_h: f64,
}

/// Screen positions of visible cell boundaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLines {
    pub columns: Vec<f64>,
    pub rows: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    origin_x: f64,
    origin_y: f64,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    width_px: f64,
    height_px: f64,
    grid_side: f64,
    drag: Option<DragAnchor>,
}

impl Viewport {
    /// Viewport at zoom 1 with the origin at the grid's top-left, then clamped
    pub fn new(grid_side: u32, width_px: u32, height_px: u32) -> Self {
        let mut viewport = Self {
            origin_x: 0.0,
            origin_y: 0.0,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            width_px: width_px.max(1) as f64,
            height_px: height_px.max(1) as f64,
            grid_side: grid_side as f64,
            drag: None,
        };
        viewport.clamp();
        viewport
    }

    /// Viewport sized and bounded by the config, centred on the grid
    pub fn from_config(config: &CanvasConfig) -> Self {
        let mut viewport = Self::new(config.grid_size, config.viewport_width, config.viewport_height)
            .with_zoom_limits(config.min_zoom, config.max_zoom);
        viewport.center();
        viewport
    }

    /// Replace the zoom bounds (the current zoom is re-clamped)
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        if min_zoom > 0.0 && min_zoom <= max_zoom && max_zoom.is_finite() {
            self.min_zoom = min_zoom;
            self.max_zoom = max_zoom;
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self.clamp();
        self
    }

    /// Put the grid's centre in the middle of the screen
    pub fn center(&mut self) {
        self.origin_x = self.grid_side / 2.0 - self.width_px / (2.0 * self.zoom);
        self.origin_y = self.grid_side / 2.0 - self.height_px / (2.0 * self.zoom);
        self.clamp();
    }

    #[inline]
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[inline]
    pub fn zoom_limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Viewport size in screen pixels
    #[inline]
    pub fn size(&self) -> (f64, f64) {
        (self.width_px, self.height_px)
    }

    /// Visible extent in grid units
    #[inline]
    pub fn visible_extent(&self) -> (f64, f64) {
        (self.width_px / self.zoom, self.height_px / self.zoom)
    }

    /// Grid cell under a screen point (may lie outside the grid)
    #[inline]
    pub fn screen_to_grid(&self, sx: f64, sy: f64) -> (i64, i64) {
        let (gx, gy) = self.screen_to_grid_exact(sx, sy);
        (gx.floor() as i64, gy.floor() as i64)
    }

    /// Continuous grid position under a screen point
    #[inline]
    pub fn screen_to_grid_exact(&self, sx: f64, sy: f64) -> (f64, f64) {
        (self.origin_x + sx / self.zoom, self.origin_y + sy / self.zoom)
    }

    /// Screen position of a cell's top-left corner
    #[inline]
    pub fn grid_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
        ((gx - self.origin_x) * self.zoom, (gy - self.origin_y) * self.zoom)
    }

    /// Whether a grid coordinate lies inside the grid
    #[inline]
    pub fn contains(&self, gx: i64, gy: i64) -> bool {
        in_grid(self.grid_side as u32, gx, gy)
    }

    /// Set the zoom directly (clamped), keeping the origin, then clamp
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            return;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.clamp();
    }

    /// Multiply the zoom by `factor`, keeping the grid point under
    /// `(sx, sy)` fixed on screen
    pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            debug!("zoom_at: ignoring factor {}", factor);
            return;
        }
        let (gx, gy) = self.screen_to_grid_exact(sx, sy);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        self.origin_x = gx - sx / self.zoom;
        self.origin_y = gy - sy / self.zoom;
        self.clamp();
    }

    /// One wheel notch: negative `delta_y` zooms in, positive zooms out
    pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            1.0 / WHEEL_ZOOM_STEP
        };
        self.zoom_at(sx, sy, factor);
    }

    /// Move the view by a screen-space delta (content follows the pointer)
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.origin_x -= dx / self.zoom;
        self.origin_y -= dy / self.zoom;
        self.clamp();
    }

    /// Start a pan drag anchored at a screen point
    pub fn begin_drag(&mut self, sx: f64, sy: f64) {
        self.drag = Some(DragAnchor {
            screen_x: sx,
            screen_y: sy,
            origin_x: self.origin_x,
            origin_y: self.origin_y,
        });
    }

    /// Continue a pan drag. The origin is solved from the anchor rather than
    /// accumulated, so sampling rate does not cause drift.
    pub fn drag_to(&mut self, sx: f64, sy: f64) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        self.origin_x = anchor.origin_x - (sx - anchor.screen_x) / self.zoom;
        self.origin_y = anchor.origin_y - (sy - anchor.screen_y) / self.zoom;
        self.clamp();
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Change the screen size of the viewport
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.width_px = width_px.max(1) as f64;
        self.height_px = height_px.max(1) as f64;
        self.clamp();
    }

    /// Constrain the origin on each axis.
    ///
    /// When the visible extent is smaller than the grid the window stays
    /// inside `[0, N]`. When it is larger the grid is centred instead of
    /// pinned to an edge.
    pub fn clamp(&mut self) {
        self.origin_x = clamp_axis(self.origin_x, self.width_px / self.zoom, self.grid_side);
        self.origin_y = clamp_axis(self.origin_y, self.height_px / self.zoom, self.grid_side);
    }

    /// Rectangles for drawing the visible part of the raster
    pub fn blit_rect(&self) -> Option<BlitRect> {
        let side = self.grid_side as u32;
        let src_x = (self.origin_x.floor().max(0.0) as u32).min(side);
        let src_y = (self.origin_y.floor().max(0.0) as u32).min(side);
        let (extent_w, extent_h) = self.visible_extent();
        let src_w = (side - src_x).min((extent_w.ceil() as u32).saturating_add(1));
        let src_h = (side - src_y).min((extent_h.ceil() as u32).saturating_add(1));
        if src_w == 0 || src_h == 0 {
            return None;
        }

        Some(BlitRect {
            src_x,
            src_y,
            src_w,
            src_h,
            dst_x: (src_x as f64 - self.origin_x) * self.zoom,
            dst_y: (src_y as f64 - self.origin_y) * self.zoom,
            dst_w: src_w as f64 * self.zoom,
            dst_h: src_h as f64 * self.zoom,
        })
    }

    /// Cell boundary positions, only once cells are large enough to separate
    pub fn grid_lines(&self) -> Option<GridLines> {
        if self.zoom < GRID_LINE_MIN_ZOOM {
            return None;
        }
        let blit = self.blit_rect()?;

        let columns = (0..=blit.src_w)
            .map(|i| blit.dst_x + i as f64 * self.zoom)
            .collect();
        let rows = (0..=blit.src_h)
            .map(|i| blit.dst_y + i as f64 * self.zoom)
            .collect();
        Some(GridLines { columns, rows })
    }
}

fn clamp_axis(origin: f64, extent: f64, side: f64) -> f64 {
    if extent >= side {
        (side - extent) / 2.0
    } else {
        origin.clamp(0.0, side - extent)
    }
}
