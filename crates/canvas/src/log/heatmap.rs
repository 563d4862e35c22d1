//! Overwrite-frequency heatmap over the event log.

use super::{EventLog, PaintEvent};
use crate::constants::CHANNELS;
use crate::types::{CellCoord, Rgba};

/// Map a normalized heat value through black -> red -> yellow -> white.
///
/// `t` is clamped to `[0, 1]`; each third of the range is one gradient leg.
pub fn heat_color(t: f64) -> Rgba {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let leg = |v: f64| ((v * 3.0).clamp(0.0, 1.0) * 255.0).round() as u8;

    if t <= 1.0 / 3.0 {
        Rgba::opaque(leg(t), 0, 0)
    } else if t <= 2.0 / 3.0 {
        Rgba::opaque(255, leg(t - 1.0 / 3.0), 0)
    } else {
        Rgba::opaque(255, 255, leg(t - 2.0 / 3.0))
    }
}

/// Per-cell count of how many events touched the cell
#[derive(Debug, Clone)]
pub struct Heatmap {
    side: u32,
    counts: Vec<u32>,
    max: u32,
}

impl Heatmap {
    pub fn new(side: u32) -> Self {
        Self {
            side,
            counts: vec![0; side as usize * side as usize],
            max: 0,
        }
    }

    /// Count every event of a log
    pub fn from_log(log: &EventLog) -> Self {
        let mut heatmap = Self::new(log.side());
        for event in log.events() {
            heatmap.record_event(event);
        }
        heatmap
    }

    /// Increment the counter of a cell (ignored outside the grid)
    pub fn record(&mut self, x: u32, y: u32) {
        if x >= self.side || y >= self.side {
            return;
        }
        let index = y as usize * self.side as usize + x as usize;
        let count = self.counts[index].saturating_add(1);
        self.counts[index] = count;
        self.max = self.max.max(count);
    }

    #[inline]
    pub fn record_event(&mut self, event: &PaintEvent) {
        self.record(event.x, event.y);
    }

    pub fn count(&self, x: u32, y: u32) -> u32 {
        if x >= self.side || y >= self.side {
            return 0;
        }
        self.counts[y as usize * self.side as usize + x as usize]
    }

    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Largest counter seen so far
    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Most overwritten cell (first in row-major order on ties)
    pub fn hottest(&self) -> Option<(CellCoord, u32)> {
        if self.max == 0 {
            return None;
        }
        let index = self.counts.iter().position(|&count| count == self.max)?;
        let side = self.side as usize;
        Some((CellCoord::new((index % side) as u32, (index / side) as u32), self.max))
    }

    pub fn clear(&mut self) {
        self.counts.fill(0);
        self.max = 0;
    }

    /// Color of a single counter under the current maximum
    pub fn color_for(&self, count: u32) -> Rgba {
        if count == 0 || self.max == 0 {
            return Rgba::BLACK;
        }
        heat_color(count as f64 / self.max as f64)
    }

    /// Render into an RGBA buffer of `side * side * 4` bytes
    pub fn render_into(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.counts.len() * CHANNELS);
        for (chunk, &count) in out.chunks_exact_mut(CHANNELS).zip(&self.counts) {
            let color = self.color_for(count);
            chunk.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Render into a freshly allocated RGBA buffer
    pub fn render(&self) -> Vec<u8> {
        let mut out = vec![0; self.counts.len() * CHANNELS];
        self.render_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_stops() {
        assert_eq!(heat_color(0.0), Rgba::BLACK);
        assert_eq!(heat_color(1.0 / 3.0), Rgba::RED);
        assert_eq!(heat_color(2.0 / 3.0), Rgba::YELLOW);
        assert_eq!(heat_color(1.0), Rgba::WHITE);
        assert_eq!(heat_color(1.0 / 9.0), Rgba::opaque(85, 0, 0));
        assert_eq!(heat_color(7.0), Rgba::WHITE);
    }

    #[test]
    fn test_counts_and_max() {
        let mut heatmap = Heatmap::new(4);
        heatmap.record(1, 1);
        heatmap.record(1, 1);
        heatmap.record(1, 1);
        heatmap.record(2, 0);
        heatmap.record(9, 9);

        assert_eq!(heatmap.count(1, 1), 3);
        assert_eq!(heatmap.count(2, 0), 1);
        assert_eq!(heatmap.max(), 3);
        assert_eq!(heatmap.hottest(), Some((CellCoord::new(1, 1), 3)));
        assert_eq!(heatmap.color_for(3), Rgba::WHITE);
        assert_eq!(heatmap.color_for(1), Rgba::RED);
        assert_eq!(heatmap.color_for(0), Rgba::BLACK);
    }

    #[test]
    fn test_empty_has_no_hottest() {
        assert_eq!(Heatmap::new(4).hottest(), None);
    }

    #[test]
    fn test_render_layout() {
        let mut heatmap = Heatmap::new(2);
        heatmap.record(1, 0);

        let buffer = heatmap.render();
        assert_eq!(buffer.len(), 16);
        assert_eq!(&buffer[0..4], &[0, 0, 0, 255]);
        assert_eq!(&buffer[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_from_log() {
        let mut log = EventLog::new(4);
        for i in 0..5u64 {
            log.append(PaintEvent::new(0, 0, Rgba::WHITE, "a", i)).unwrap();
        }
        log.append(PaintEvent::new(3, 3, Rgba::WHITE, "b", 5)).unwrap();

        let heatmap = Heatmap::from_log(&log);
        assert_eq!(heatmap.count(0, 0), 5);
        assert_eq!(heatmap.count(3, 3), 1);
        assert_eq!(heatmap.max(), 5);
    }
}
