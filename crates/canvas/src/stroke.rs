//! Stroke rasterization for drag-to-paint
//!
//! Pointer samples arrive at whatever rate the input source delivers them;
//! a fast drag can jump several cells between samples. [`interpolate`]
//! fills the gap with integer Bresenham stepping so the painted path is
//! connected.

use tracing::debug;

use crate::types::CellCoord;
use crate::validation::in_grid;

/// Every cell on the straight line from `from` to `to`, both inclusive.
///
/// The walk always starts from the lexicographically smaller endpoint and is
/// reversed afterwards if needed, so swapping the endpoints yields exactly
/// the reversed sequence. Consecutive cells are 8-connected.
///
/// The walk visits every cell between the endpoints; callers with unbounded
/// input clip first with [`clip_segment`].
pub fn interpolate(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    if from <= to {
        bresenham(from, to)
    } else {
        let mut cells = bresenham(to, from);
        cells.reverse();
        cells
    }
}

fn bresenham((x0, y0): (i64, i64), (x1, y1): (i64, i64)) -> Vec<(i64, i64)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut cells = Vec::with_capacity(dx.max(-dy) as usize + 1);
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        cells.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    cells
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Converges in at most four moves for finite input
const MAX_CLIP_STEPS: usize = 16;

fn outcode(max: f64, x: f64, y: f64) -> u8 {
    let mut code = 0;
    if x < 0.0 {
        code |= LEFT;
    } else if x > max {
        code |= RIGHT;
    }
    if y < 0.0 {
        code |= TOP;
    } else if y > max {
        code |= BOTTOM;
    }
    code
}

/// Clip the segment `from -> to` to the cells of a `side` x `side` grid
/// (Cohen-Sutherland).
///
/// Endpoints inside the grid come back unchanged; outside endpoints move to
/// the nearest cell on the grid edge along the segment. `None` when the
/// segment misses the grid.
pub fn clip_segment(side: u32, from: (i64, i64), to: (i64, i64)) -> Option<((i64, i64), (i64, i64))> {
    if side == 0 {
        return None;
    }
    let max = (side - 1) as f64;
    let (mut x0, mut y0) = (from.0 as f64, from.1 as f64);
    let (mut x1, mut y1) = (to.0 as f64, to.1 as f64);
    let mut code0 = outcode(max, x0, y0);
    let mut code1 = outcode(max, x1, y1);

    for _ in 0..MAX_CLIP_STEPS {
        if (code0 | code1) == 0 {
            return Some(((x0 as i64, y0 as i64), (x1 as i64, y1 as i64)));
        }
        if (code0 & code1) != 0 {
            return None;
        }

        let first = code0 != 0;
        let outside = if first { code0 } else { code1 };
        let (x, y) = if outside & TOP != 0 {
            (x0 + (x1 - x0) * (0.0 - y0) / (y1 - y0), 0.0)
        } else if outside & BOTTOM != 0 {
            (x0 + (x1 - x0) * (max - y0) / (y1 - y0), max)
        } else if outside & LEFT != 0 {
            (0.0, y0 + (y1 - y0) * (0.0 - x0) / (x1 - x0))
        } else {
            (max, y0 + (y1 - y0) * (max - x0) / (x1 - x0))
        };
        let (x, y) = (x.round(), y.round());

        if first {
            (x0, y0) = (x, y);
            code0 = outcode(max, x0, y0);
        } else {
            (x1, y1) = (x, y);
            code1 = outcode(max, x1, y1);
        }
    }
    None
}

/// The ephemeral stroke between pointer-down and pointer-up/leave.
///
/// Tracks the last sampled grid position so each new sample expands into
/// the cells between it and the previous one. Cells outside the grid are
/// dropped here so they never reach the raster.
#[derive(Debug, Clone)]
pub struct StrokeTracker {
    side: u32,
    last: Option<(i64, i64)>,
}

impl StrokeTracker {
    pub fn new(side: u32) -> Self {
        Self { side, last: None }
    }

    /// Start a stroke at a grid position; returns the first cell if in-grid
    pub fn begin(&mut self, gx: i64, gy: i64) -> Vec<CellCoord> {
        self.last = Some((gx, gy));
        self.clip(std::iter::once((gx, gy)))
    }

    /// Continue the stroke to a grid position.
    ///
    /// Returns the newly covered in-grid cells, excluding the previous end
    /// cell. Without an active stroke this behaves like [`StrokeTracker::begin`].
    pub fn extend(&mut self, gx: i64, gy: i64) -> Vec<CellCoord> {
        let Some(last) = self.last else {
            return self.begin(gx, gy);
        };
        if last == (gx, gy) {
            return Vec::new();
        }

        let next = (gx, gy);
        self.last = Some(next);

        // Clip in canonical order so both directions give the same cells
        let (lo, hi) = if last <= next { (last, next) } else { (next, last) };
        let Some((clip_lo, clip_hi)) = clip_segment(self.side, lo, hi) else {
            return Vec::new();
        };
        let mut path = interpolate(clip_lo, clip_hi);
        if lo != last {
            path.reverse();
        }
        if path.len() > 2 {
            debug!(
                "stroke jump ({}, {}) -> ({}, {}) filled with {} cells",
                last.0,
                last.1,
                gx,
                gy,
                path.len() - 2
            );
        }
        // An in-grid previous end was already staged by the last sample
        let skip = usize::from(in_grid(self.side, last.0, last.1));
        self.clip(path.into_iter().skip(skip))
    }

    /// Finish the stroke (pointer up or leave)
    pub fn end(&mut self) {
        self.last = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    fn clip(&self, cells: impl Iterator<Item = (i64, i64)>) -> Vec<CellCoord> {
        cells
            .filter(|&(x, y)| in_grid(self.side, x, y))
            .map(|(x, y)| CellCoord::new(x as u32, y as u32))
            .collect()
    }
}
