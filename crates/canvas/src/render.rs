//! Display surface seam and per-frame render coalescing

use image::RgbaImage;
use tracing::debug;

use crate::raster::TileCoord;

/// Anything that can receive the raw `side * side * 4` RGBA buffer.
///
/// `dirty` lists the tiles that changed since the previous upload. An empty
/// slice means the whole buffer must be treated as new.
pub trait DisplaySurface {
    fn upload(&mut self, rgba: &[u8], side: u32, dirty: &[TileCoord]);
}

impl DisplaySurface for RgbaImage {
    fn upload(&mut self, rgba: &[u8], side: u32, _dirty: &[TileCoord]) {
        if self.dimensions() != (side, side) {
            *self = RgbaImage::new(side, side);
        }
        self.copy_from_slice(rgba);
    }
}

/// Collapses any number of redraw requests within a frame into one redraw.
///
/// Handlers call [`RenderQueue::request`] after each state change; the frame
/// callback calls [`RenderQueue::take_frame`] once per animation frame.
#[derive(Debug, Default)]
pub struct RenderQueue {
    queued: bool,
    requests: u64,
    frames: u64,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw on the next frame.
    ///
    /// Returns `true` only for the request that actually queued the frame.
    pub fn request(&mut self) -> bool {
        self.requests += 1;
        if self.queued {
            return false;
        }
        self.queued = true;
        true
    }

    /// Consume the queued redraw, if any
    pub fn take_frame(&mut self) -> bool {
        if !self.queued {
            return false;
        }
        self.queued = false;
        self.frames += 1;
        debug!(
            "render frame {} ({} requests so far)",
            self.frames, self.requests
        );
        true
    }

    #[inline]
    pub fn is_queued(&self) -> bool {
        self.queued
    }

    /// Number of frames actually rendered
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let mut queue = RenderQueue::new();
        assert!(queue.request());
        assert!(!queue.request());
        assert!(!queue.request());

        assert!(queue.take_frame());
        assert!(!queue.take_frame());
        assert_eq!(queue.frames(), 1);

        assert!(queue.request());
        assert!(queue.is_queued());
    }

    #[test]
    fn test_image_surface_resizes() {
        let mut image = RgbaImage::new(1, 1);
        let buffer = vec![7u8; 2 * 2 * 4];
        image.upload(&buffer, 2, &[]);
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.as_raw(), &buffer);
    }
}
