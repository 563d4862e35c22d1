//! Cell reads, region queries and checked writes

use super::{RasterStore, TileCoord};
use crate::constants::CHANNELS;
use crate::types::Rgba;
use crate::validation::{check_cell, CanvasError};

impl RasterStore {
    /// Read a cell. `(x, y)` must be inside the grid.
    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> Rgba {
        let offset = self.offset(x, y);
        let chunk = &self.pixels[offset..offset + CHANNELS];
        Rgba {
            r: chunk[0],
            g: chunk[1],
            b: chunk[2],
            a: chunk[3],
        }
    }

    /// Read a cell, returning `None` outside the grid
    pub fn try_cell(&self, x: i64, y: i64) -> Option<Rgba> {
        let coord = check_cell(self.side, x, y).ok()?;
        Some(self.cell(coord.x, coord.y))
    }

    /// Bounds-checked [`RasterStore::set_cell`]
    pub fn try_set_cell(&mut self, x: i64, y: i64, color: Rgba) -> Result<(), CanvasError> {
        let coord = check_cell(self.side, x, y)?;
        self.set_cell(coord.x, coord.y, color);
        Ok(())
    }

    /// Raw RGBA bytes, row-major
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Cells as colors (zero-copy view of the byte buffer)
    #[inline]
    pub fn cells(&self) -> &[Rgba] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.side as usize * self.side as usize
    }

    /// Number of cells that differ from the background
    pub fn lit_count(&self) -> usize {
        let background = self.background;
        self.cells().iter().filter(|c| **c != background).count()
    }

    /// Tile bounds `(x, y, width, height)` in cells; edge tiles may be smaller
    pub fn tile_bounds(&self, coord: TileCoord) -> (u32, u32, u32, u32) {
        let start_x = coord.x * self.tile_size;
        let start_y = coord.y * self.tile_size;
        let width = self.tile_size.min(self.side.saturating_sub(start_x));
        let height = self.tile_size.min(self.side.saturating_sub(start_y));
        (start_x, start_y, width, height)
    }

    /// RGBA bytes of a rectangular region, clamped to the grid
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
        let x_end = x.saturating_add(width).min(self.side);
        let y_end = y.saturating_add(height).min(self.side);
        if x >= x_end || y >= y_end {
            return Vec::new();
        }

        let row_bytes = (x_end - x) as usize * CHANNELS;
        let mut data = Vec::with_capacity(row_bytes * (y_end - y) as usize);
        for row in y..y_end {
            let start = self.offset(x, row);
            data.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_accessors() {
        let mut raster = RasterStore::new(4);
        assert!(raster.try_set_cell(3, 3, Rgba::WHITE).is_ok());
        assert_eq!(raster.try_cell(3, 3), Some(Rgba::WHITE));
        assert_eq!(raster.try_cell(4, 0), None);
        assert_eq!(
            raster.try_set_cell(-1, 0, Rgba::WHITE),
            Err(CanvasError::OutOfBounds { x: -1, y: 0, side: 4 })
        );
    }

    #[test]
    fn test_region_clamped() {
        let mut raster = RasterStore::new(4);
        raster.set_cell(3, 3, Rgba::WHITE);

        let region = raster.region(2, 2, 10, 10);
        assert_eq!(region.len(), 2 * 2 * 4);
        assert_eq!(&region[12..16], &[255, 255, 255, 255]);
        assert!(raster.region(4, 0, 1, 1).is_empty());
    }

    #[test]
    fn test_cells_view_matches_bytes() {
        let mut raster = RasterStore::new(2);
        raster.set_cell(1, 0, Rgba::opaque(9, 8, 7));
        assert_eq!(raster.cells()[1], Rgba::opaque(9, 8, 7));
        assert_eq!(raster.cell_count(), 4);
    }
}
