//! Pending-edit buffer: staged cell changes awaiting submission
//!
//! Staging paints the raster immediately for preview and remembers the
//! color the cell had before it was first touched. Cancel writes those
//! originals back; commit hands the ordered list to the submission flow.

mod batch;

use hashlink::LinkedHashMap;
use tracing::debug;

use crate::raster::RasterStore;
use crate::types::{CellCoord, Rgba};

pub use batch::{BatchColumns, CommittedBatch, SubmissionEntry};

/// A staged but not yet committed cell change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEdit {
    pub cell: CellCoord,
    /// Color before the first stage touched this cell
    pub original: Rgba,
    /// Color shown and submitted on commit
    pub staged: Rgba,
}

/// Ordered, per-cell-unique set of staged edits.
///
/// Entries are keyed by the packed cell index, so a cell appears at most
/// once and the commit size is simply the number of entries.
#[derive(Debug)]
pub struct PendingEdits {
    side: u32,
    entries: LinkedHashMap<u64, PendingEdit>,
}

impl PendingEdits {
    pub fn new(side: u32) -> Self {
        Self {
            side,
            entries: LinkedHashMap::new(),
        }
    }

    /// Stage `color` at `(x, y)` and paint it into the raster.
    ///
    /// Re-staging an already staged cell is a no-op: the first-seen original
    /// and the first staged color are kept. Returns whether the cell was
    /// newly staged.
    pub fn stage(&mut self, raster: &mut RasterStore, cell: CellCoord, color: Rgba) -> bool {
        let key = cell.pack(self.side);
        if self.entries.contains_key(&key) {
            return false;
        }

        let staged = color.with_opaque_alpha();
        let original = raster.cell(cell.x, cell.y);
        raster.set_cell(cell.x, cell.y, staged);
        self.entries.insert(
            key,
            PendingEdit {
                cell,
                original,
                staged,
            },
        );
        true
    }

    /// Drop a single staged cell, restoring its original color
    pub fn unstage(&mut self, raster: &mut RasterStore, cell: CellCoord) -> bool {
        match self.entries.remove(&cell.pack(self.side)) {
            Some(edit) => {
                raster.set_cell(edit.cell.x, edit.cell.y, edit.original);
                true
            }
            None => false,
        }
    }

    /// Stage the cell, or unstage it if it is already staged
    pub fn toggle(&mut self, raster: &mut RasterStore, cell: CellCoord, color: Rgba) -> bool {
        if self.unstage(raster, cell) {
            return false;
        }
        self.stage(raster, cell, color)
    }

    /// Restore every original color and empty the buffer.
    ///
    /// Returns the number of cells restored.
    pub fn cancel(&mut self, raster: &mut RasterStore) -> usize {
        let count = self.entries.len();
        for edit in self.entries.values().rev() {
            raster.set_cell(edit.cell.x, edit.cell.y, edit.original);
        }
        self.entries.clear();
        if count > 0 {
            debug!("Cancelled {} staged cells", count);
        }
        count
    }

    /// Take the ordered staged list and empty the buffer.
    ///
    /// The raster is left as is; the staged colors are already painted.
    pub fn commit(&mut self) -> CommittedBatch {
        let edits: Vec<PendingEdit> = std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, edit)| edit)
            .collect();
        debug!("Committed {} staged cells", edits.len());
        CommittedBatch::new(edits)
    }

    /// Replace the remembered original of a staged cell.
    ///
    /// Used when an authoritative write lands on a cell the user has staged,
    /// so a later cancel restores the authoritative color. Returns whether
    /// the cell was staged.
    pub fn rebase_original(&mut self, cell: CellCoord, color: Rgba) -> bool {
        match self.entries.get_mut(&cell.pack(self.side)) {
            Some(edit) => {
                edit.original = color.with_opaque_alpha();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, cell: CellCoord) -> Option<&PendingEdit> {
        self.entries.get(&cell.pack(self.side))
    }

    #[inline]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell.pack(self.side))
    }

    /// Staged edits in staging order
    pub fn iter(&self) -> impl Iterator<Item = &PendingEdit> {
        self.entries.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total price of committing the current set
    pub fn cost(&self, unit_cost: f64) -> f64 {
        self.entries.len() as f64 * unit_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(raster: &mut RasterStore, seed: u32) {
        let side = raster.side();
        for y in 0..side {
            for x in 0..side {
                let v = (x * 31 + y * 17 + seed) as u8;
                raster.set_cell(x, y, Rgba::opaque(v, v.wrapping_mul(3), v ^ 0x5a));
            }
        }
    }

    #[test]
    fn test_stage_first_touch_wins() {
        let mut raster = RasterStore::new(8);
        let mut pending = PendingEdits::new(8);
        let cell = CellCoord::new(2, 2);

        assert!(pending.stage(&mut raster, cell, Rgba::WHITE));
        assert!(!pending.stage(&mut raster, cell, Rgba::RED));

        let edit = pending.get(cell).unwrap();
        assert_eq!(edit.original, Rgba::BLACK);
        assert_eq!(edit.staged, Rgba::WHITE);
        assert_eq!(raster.cell(2, 2), Rgba::WHITE);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_cancel_restores_exactly() {
        let mut raster = RasterStore::new(8);
        painted(&mut raster, 3);
        let before = raster.as_bytes().to_vec();

        let mut pending = PendingEdits::new(8);
        // Two overlapping "strokes" touching some cells twice
        for x in 0..8 {
            pending.stage(&mut raster, CellCoord::new(x, 3), Rgba::WHITE);
        }
        for y in 0..8 {
            pending.stage(&mut raster, CellCoord::new(3, y), Rgba::RED);
        }
        assert_eq!(pending.len(), 15);
        assert_ne!(raster.as_bytes(), &before[..]);

        assert_eq!(pending.cancel(&mut raster), 15);
        assert!(pending.is_empty());
        assert_eq!(raster.as_bytes(), &before[..]);
    }

    #[test]
    fn test_cancel_empty_is_noop() {
        let mut raster = RasterStore::new(4);
        let mut pending = PendingEdits::new(4);
        assert_eq!(pending.cancel(&mut raster), 0);
        assert!(pending.commit().is_empty());
    }

    #[test]
    fn test_commit_preserves_order() {
        let mut raster = RasterStore::new(8);
        let mut pending = PendingEdits::new(8);
        let cells = [CellCoord::new(5, 1), CellCoord::new(0, 0), CellCoord::new(7, 7)];
        for cell in cells {
            pending.stage(&mut raster, cell, Rgba::YELLOW);
        }

        let batch = pending.commit();
        assert!(pending.is_empty());
        let committed: Vec<CellCoord> = batch.edits().iter().map(|e| e.cell).collect();
        assert_eq!(committed, cells);
        assert_eq!(raster.cell(7, 7), Rgba::YELLOW);
    }

    #[test]
    fn test_unstage_and_toggle() {
        let mut raster = RasterStore::new(4);
        let mut pending = PendingEdits::new(4);
        let cell = CellCoord::new(1, 1);

        assert!(pending.toggle(&mut raster, cell, Rgba::WHITE));
        assert_eq!(raster.cell(1, 1), Rgba::WHITE);
        assert!(!pending.toggle(&mut raster, cell, Rgba::WHITE));
        assert_eq!(raster.cell(1, 1), Rgba::BLACK);
        assert!(pending.is_empty());
        assert!(!pending.unstage(&mut raster, cell));
    }

    #[test]
    fn test_rebase_original() {
        let mut raster = RasterStore::new(4);
        let mut pending = PendingEdits::new(4);
        let cell = CellCoord::new(0, 1);
        pending.stage(&mut raster, cell, Rgba::WHITE);

        assert!(pending.rebase_original(cell, Rgba::RED));
        assert!(!pending.rebase_original(CellCoord::new(3, 3), Rgba::RED));

        pending.cancel(&mut raster);
        assert_eq!(raster.cell(0, 1), Rgba::RED);
    }

    #[test]
    fn test_cost_is_linear_in_len() {
        let mut raster = RasterStore::new(4);
        let mut pending = PendingEdits::new(4);
        for x in 0..4 {
            pending.stage(&mut raster, CellCoord::new(x, 0), Rgba::WHITE);
            pending.stage(&mut raster, CellCoord::new(x, 0), Rgba::WHITE);
        }
        assert_eq!(pending.cost(0.01), 4.0 * 0.01);
        assert_eq!(pending.cost(1.0), 4.0);
    }
}
