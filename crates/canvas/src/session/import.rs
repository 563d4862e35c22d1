//! Stage an image onto the grid

use image::RgbaImage;
use tracing::info;

use super::CanvasSession;
use crate::constants::IMPORT_ALPHA_THRESHOLD;
use crate::types::{CellCoord, Rgba};
use crate::validation::{in_grid, CanvasError};

impl CanvasSession {
    /// Stage every sufficiently opaque pixel of `image` with its top-left at
    /// grid `(x, y)`.
    ///
    /// Pixels with alpha below the threshold or landing outside the grid are
    /// skipped. Returns the number of newly staged cells.
    pub fn stage_image(&mut self, image: &RgbaImage, x: i64, y: i64) -> Result<usize, CanvasError> {
        self.ensure_can_stage()?;

        let side = self.side();
        let cells: Vec<(CellCoord, Rgba)> = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel.0[3] >= IMPORT_ALPHA_THRESHOLD)
            .filter_map(|(px, py, pixel)| {
                let gx = x + px as i64;
                let gy = y + py as i64;
                in_grid(side, gx, gy).then(|| {
                    let [r, g, b, _] = pixel.0;
                    (CellCoord::new(gx as u32, gy as u32), Rgba::opaque(r, g, b))
                })
            })
            .collect();

        let mut staged = 0;
        for (cell, color) in cells {
            if self.pending.stage(&mut self.raster, cell, color) {
                staged += 1;
            }
        }
        if staged > 0 {
            self.render_queue.request();
        }
        info!(
            "Imported {}x{} image at ({}, {}): {} cells staged",
            image.width(),
            image.height(),
            x,
            y,
            staged
        );
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::session;
    use super::*;
    use image::Rgba as Pixel;

    fn sample_image() -> RgbaImage {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Pixel([255, 0, 0, 255]));
        image.put_pixel(1, 0, Pixel([0, 255, 0, 128]));
        image.put_pixel(2, 0, Pixel([0, 0, 255, 127]));
        image.put_pixel(0, 1, Pixel([10, 20, 30, 200]));
        image
    }

    #[test]
    fn test_alpha_threshold() {
        let mut session = session(8);
        assert_eq!(session.stage_image(&sample_image(), 1, 1).unwrap(), 3);
        assert_eq!(session.raster().cell(1, 1), Rgba::RED);
        assert_eq!(session.raster().cell(2, 1), Rgba::opaque(0, 255, 0));
        assert_eq!(session.raster().cell(3, 1), Rgba::BLACK);
        assert_eq!(session.raster().cell(1, 2), Rgba::opaque(10, 20, 30));
    }

    #[test]
    fn test_clipped_at_grid_edges() {
        let mut session = session(8);
        assert_eq!(session.stage_image(&sample_image(), 7, -1).unwrap(), 1);
        assert_eq!(session.raster().cell(7, 0), Rgba::opaque(10, 20, 30));

        session.cancel_pending();
        assert_eq!(session.raster().lit_count(), 0);
    }

    #[test]
    fn test_refused_while_in_flight() {
        let mut session = session(8);
        session.stage_image(&sample_image(), 0, 0).unwrap();
        session.commit_pending().unwrap();
        assert_eq!(
            session.stage_image(&sample_image(), 4, 4),
            Err(CanvasError::SubmissionInFlight)
        );
    }
}
