//! Committed batches handed to the submission collaborator

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PendingEdit;
use crate::raster::RasterStore;
use crate::types::{CellCoord, Rgba};
use crate::validation::CanvasError;

/// One cell of a submission: coordinate plus final color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub x: u32,
    pub y: u32,
    pub color: Rgba,
}

/// Column-wise form of a batch for the multi-pixel contract call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchColumns {
    pub xs: Vec<u16>,
    pub ys: Vec<u16>,
    /// Packed `0xRRGGBB`
    pub colors: Vec<u32>,
}

/// Snapshot of the pending buffer taken by commit.
///
/// Keeps the original colors so a failed or abandoned submission can be
/// reverted exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommittedBatch {
    edits: Vec<PendingEdit>,
}

impl CommittedBatch {
    pub(crate) fn new(edits: Vec<PendingEdit>) -> Self {
        Self { edits }
    }

    pub fn edits(&self) -> &[PendingEdit] {
        &self.edits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Total price of the batch
    pub fn cost(&self, unit_cost: f64) -> f64 {
        self.edits.len() as f64 * unit_cost
    }

    /// Ordered `(x, y, final color)` list for the submission collaborator
    pub fn submission(&self) -> Vec<SubmissionEntry> {
        self.edits
            .iter()
            .map(|edit| SubmissionEntry {
                x: edit.cell.x,
                y: edit.cell.y,
                color: edit.staged,
            })
            .collect()
    }

    /// Split into `xs / ys / colors` arrays.
    ///
    /// Fails if a coordinate does not fit the contract's uint16.
    pub fn columns(&self) -> Result<BatchColumns, CanvasError> {
        let mut columns = BatchColumns {
            xs: Vec::with_capacity(self.edits.len()),
            ys: Vec::with_capacity(self.edits.len()),
            colors: Vec::with_capacity(self.edits.len()),
        };
        for edit in &self.edits {
            let (Ok(x), Ok(y)) = (u16::try_from(edit.cell.x), u16::try_from(edit.cell.y)) else {
                return Err(CanvasError::OutOfBounds {
                    x: edit.cell.x as i64,
                    y: edit.cell.y as i64,
                    side: u16::MAX as u32 + 1,
                });
            };
            columns.xs.push(x);
            columns.ys.push(y);
            columns.colors.push(edit.staged.to_uint24());
        }
        Ok(columns)
    }

    /// Write the original colors back (submission failed or was abandoned)
    pub fn revert(&self, raster: &mut RasterStore) -> usize {
        for edit in self.edits.iter().rev() {
            raster.set_cell(edit.cell.x, edit.cell.y, edit.original);
        }
        debug!("Reverted {} submitted cells", self.edits.len());
        self.edits.len()
    }

    /// See [`super::PendingEdits::rebase_original`]
    pub fn rebase_original(&mut self, cell: CellCoord, color: Rgba) -> bool {
        match self.edits.iter_mut().find(|edit| edit.cell == cell) {
            Some(edit) => {
                edit.original = color.with_opaque_alpha();
                true
            }
            None => false,
        }
    }

    /// Whether the batch contains a cell
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.edits.iter().any(|edit| edit.cell == cell)
    }
}
