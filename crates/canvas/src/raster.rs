//! Raster store: the persistent pixel grid with dirty tracking

mod data_access;
mod dirty_tracking;

use std::collections::HashSet;

use pixelburn_config::DEFAULT_TILE_SIZE;
use serde::{Deserialize, Serialize};

use crate::constants::{CHANNELS, OPAQUE};
use crate::types::Rgba;

/// Tile coordinates (in tiles, not cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Square RGBA grid of side N stored as a flat row-major byte array.
///
/// Cell `(x, y)` occupies bytes `(y*N + x)*4 .. +4`. Every cell always holds a
/// fully opaque color; there is no unset state.
#[derive(Clone)]
pub struct RasterStore {
    pub(crate) side: u32,
    pub(crate) pixels: Vec<u8>,
    pub(crate) background: Rgba,
    pub(crate) tile_size: u32,
    tiles_per_row: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl std::fmt::Debug for RasterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterStore")
            .field("side", &self.side)
            .field("tile_size", &self.tile_size)
            .field("dirty_tiles", &self.dirty_tiles.len())
            .finish()
    }
}

impl RasterStore {
    /// Create an opaque black grid of the given side with the default tile size
    pub fn new(side: u32) -> Self {
        Self::with_tile_size(side, DEFAULT_TILE_SIZE)
    }

    /// Create an opaque black grid with an explicit dirty-tracking tile size
    pub fn with_tile_size(side: u32, tile_size: u32) -> Self {
        Self::with_background(side, tile_size, Rgba::BLACK)
    }

    /// Create a grid filled with `background` (alpha is forced to opaque)
    pub fn with_background(side: u32, tile_size: u32, background: Rgba) -> Self {
        let tile_size = tile_size.max(1);
        let tiles_per_row = side.div_ceil(tile_size);
        let mut store = Self {
            side,
            pixels: vec![0; side as usize * side as usize * CHANNELS],
            background: background.with_opaque_alpha(),
            tile_size,
            tiles_per_row,
            dirty_tiles: HashSet::new(),
        };
        store.clear(store.background);
        store
    }

    /// Fill every cell with `color` and mark the whole grid dirty
    pub fn clear(&mut self, color: Rgba) {
        let cell = [color.r, color.g, color.b, OPAQUE];
        for chunk in self.pixels.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&cell);
        }
        self.mark_all_dirty();
    }

    /// Reset to the background color the store was created with
    pub fn reset(&mut self) {
        self.clear(self.background);
    }

    /// Write a cell's color channels, force alpha opaque, and mark it dirty.
    ///
    /// `(x, y)` must be inside the grid; callers validate through the
    /// viewport, stroke or log layers. Only debug builds assert this.
    #[inline]
    pub fn set_cell(&mut self, x: u32, y: u32, color: Rgba) {
        debug_assert!(
            x < self.side && y < self.side,
            "set_cell({}, {}) outside {}x{} grid",
            x,
            y,
            self.side,
            self.side
        );
        let offset = self.offset(x, y);
        self.pixels[offset..offset + CHANNELS].copy_from_slice(&[color.r, color.g, color.b, OPAQUE]);
        self.mark_dirty(x, y);
    }

    /// Side of the grid in cells
    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Background color used by [`RasterStore::reset`]
    #[inline]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Dirty-tracking tile size in cells
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of tiles along one axis
    #[inline]
    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }

    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.side as usize + x as usize) * CHANNELS
    }
}
