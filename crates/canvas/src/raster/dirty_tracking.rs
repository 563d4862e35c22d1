//! Dirty tile tracking and display sync

use tracing::debug;

use super::{RasterStore, TileCoord};
use crate::render::DisplaySurface;

impl RasterStore {
    /// Mark the tile containing a cell as modified
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.side || y >= self.side {
            return;
        }
        self.dirty_tiles.insert(TileCoord {
            x: x / self.tile_size,
            y: y / self.tile_size,
        });
    }

    /// Mark every tile as modified
    pub fn mark_all_dirty(&mut self) {
        let tiles = self.tiles_per_row();
        for ty in 0..tiles {
            for tx in 0..tiles {
                self.dirty_tiles.insert(TileCoord { x: tx, y: ty });
            }
        }
    }

    /// Whether anything changed since the last sync
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    /// Number of modified tiles
    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }

    /// Get all dirty tiles in row-major order and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self.dirty_tiles.drain().collect();
        tiles.sort_unstable_by_key(|t| (t.y, t.x));
        tiles
    }

    /// Copy the buffer to the display surface if anything changed.
    ///
    /// Returns `true` if an upload happened. Calling this again with no
    /// intervening write is a no-op.
    pub fn sync_to_display<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.is_dirty() {
            return false;
        }
        let tiles = self.take_dirty_tiles();
        debug!("sync_to_display: {} dirty tiles", tiles.len());
        surface.upload(&self.pixels, self.side, &tiles);
        true
    }
}
