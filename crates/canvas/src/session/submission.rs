//! Commit, cancel and submission outcomes

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::CanvasSession;
use crate::pending::{CommittedBatch, SubmissionEntry};
use crate::validation::CanvasError;

/// How the submission collaborator finished with an in-flight batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionResult {
    /// Accepted: the staged colors are now authoritative
    Confirmed,
    /// Rejected or errored: put the original colors back
    Failed,
    /// The user or host gave up on it: same as failed
    Abandoned,
}

impl CanvasSession {
    /// Restore every staged cell's original color and empty the buffer
    pub fn cancel_pending(&mut self) -> usize {
        let restored = self.pending.cancel(&mut self.raster);
        self.end_stroke();
        if restored > 0 {
            self.render_queue.request();
        }
        restored
    }

    /// Snapshot the staged cells for submission.
    ///
    /// Returns `None` when nothing is staged. The batch moves to the
    /// in-flight slot; until it is resolved no new cell can be staged.
    pub fn commit_pending(&mut self) -> Result<Option<Vec<SubmissionEntry>>, CanvasError> {
        self.ensure_can_stage()?;
        if self.pending.is_empty() {
            return Ok(None);
        }
        self.end_stroke();

        let batch = self.pending.commit();
        let entries = batch.submission();
        info!(
            "Committing {} cells (cost {})",
            batch.len(),
            batch.cost(self.config.cost_per_pixel)
        );
        self.in_flight = Some(batch);
        Ok(Some(entries))
    }

    /// Settle the in-flight batch.
    ///
    /// Returns the number of cells in the batch.
    pub fn resolve_submission(&mut self, result: SubmissionResult) -> Result<usize, CanvasError> {
        let batch = self
            .in_flight
            .take()
            .ok_or(CanvasError::NoSubmissionInFlight)?;

        match result {
            SubmissionResult::Confirmed => {
                info!("Submission of {} cells confirmed", batch.len());
            }
            SubmissionResult::Failed | SubmissionResult::Abandoned => {
                warn!("Submission {:?}: reverting {} cells", result, batch.len());
                batch.revert(&mut self.raster);
                self.render_queue.request();
            }
        }
        Ok(batch.len())
    }

    /// The batch awaiting a submission outcome, if any
    #[inline]
    pub fn in_flight(&self) -> Option<&CommittedBatch> {
        self.in_flight.as_ref()
    }

    /// Price of committing what is currently staged
    pub fn pending_cost(&self) -> f64 {
        self.pending.cost(self.config.cost_per_pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::session;
    use super::super::{PointerPhase, PointerSample};
    use super::*;
    use crate::log::PaintEvent;
    use crate::types::{CellCoord, Rgba};

    fn paint_column(session: &mut CanvasSession) -> Result<usize, CanvasError> {
        session.handle_pointer(PointerSample::new(PointerPhase::Down, 2.5, 2.5))?;
        session.handle_pointer(PointerSample::new(PointerPhase::Move, 2.5, 3.5))?;
        session.handle_pointer(PointerSample::new(PointerPhase::Up, 2.5, 3.5))
    }

    #[test]
    fn test_stage_cancel_commit_confirm() {
        let mut session = session(8);
        let black = session.raster().as_bytes().to_vec();

        paint_column(&mut session).unwrap();
        assert_eq!(session.pending().len(), 2);
        assert_eq!(session.raster().cell(2, 2), Rgba::WHITE);
        assert_eq!(session.raster().cell(2, 3), Rgba::WHITE);
        assert_eq!(session.pending_cost(), 2.0);

        assert_eq!(session.cancel_pending(), 2);
        assert_eq!(session.raster().as_bytes(), &black[..]);
        assert!(session.pending().is_empty());

        paint_column(&mut session).unwrap();
        let entries = session.commit_pending().unwrap().unwrap();
        assert_eq!(
            entries,
            vec![
                SubmissionEntry { x: 2, y: 2, color: Rgba::WHITE },
                SubmissionEntry { x: 2, y: 3, color: Rgba::WHITE },
            ]
        );
        assert!(session.pending().is_empty());
        assert!(session.in_flight().is_some());

        assert_eq!(session.resolve_submission(SubmissionResult::Confirmed).unwrap(), 2);
        assert_eq!(session.raster().cell(2, 2), Rgba::WHITE);
        assert_eq!(session.raster().cell(2, 3), Rgba::WHITE);
        assert!(session.in_flight().is_none());
    }

    #[test]
    fn test_failed_submission_reverts() {
        let mut session = session(8);
        let black = session.raster().as_bytes().to_vec();
        paint_column(&mut session).unwrap();
        session.commit_pending().unwrap();

        assert_eq!(session.resolve_submission(SubmissionResult::Failed).unwrap(), 2);
        assert_eq!(session.raster().as_bytes(), &black[..]);
    }

    #[test]
    fn test_in_flight_blocks_staging() {
        let mut session = session(8);
        paint_column(&mut session).unwrap();
        session.commit_pending().unwrap();

        assert_eq!(
            session.handle_pointer(PointerSample::new(PointerPhase::Down, 5.5, 5.5)),
            Err(CanvasError::SubmissionInFlight)
        );
        assert_eq!(session.commit_pending(), Err(CanvasError::SubmissionInFlight));
        assert!(session.pending().is_empty());

        session.resolve_submission(SubmissionResult::Abandoned).unwrap();
        assert_eq!(
            session
                .handle_pointer(PointerSample::new(PointerPhase::Down, 5.5, 5.5))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_commit_mid_stroke_ends_it() {
        let mut session = session(8);
        session
            .handle_pointer(PointerSample::new(PointerPhase::Down, 0.5, 0.5))
            .unwrap();
        session.commit_pending().unwrap();
        // The stroke ended with the commit, so this move stages nothing
        assert_eq!(
            session
                .handle_pointer(PointerSample::new(PointerPhase::Move, 3.5, 0.5))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_resolve_without_batch() {
        let mut session = session(8);
        assert_eq!(
            session.resolve_submission(SubmissionResult::Confirmed),
            Err(CanvasError::NoSubmissionInFlight)
        );
        assert_eq!(session.commit_pending(), Ok(None));
    }

    #[test]
    fn test_event_on_staged_cell_rebases_original() {
        let mut session = session(8);
        paint_column(&mut session).unwrap();

        session
            .ingest(PaintEvent::new(2, 2, Rgba::RED, "other", 0))
            .unwrap();
        // The local preview wins until cancel
        assert_eq!(session.raster().cell(2, 2), Rgba::WHITE);

        session.cancel_pending();
        assert_eq!(session.raster().cell(2, 2), Rgba::RED);
        assert_eq!(session.raster().cell(2, 3), Rgba::BLACK);
    }

    #[test]
    fn test_event_on_in_flight_cell_survives_revert() {
        let mut session = session(8);
        paint_column(&mut session).unwrap();
        session.commit_pending().unwrap();

        session
            .ingest(PaintEvent::new(2, 3, Rgba::YELLOW, "other", 0))
            .unwrap();
        session.resolve_submission(SubmissionResult::Failed).unwrap();

        assert_eq!(session.raster().cell(2, 3), Rgba::YELLOW);
        assert_eq!(session.raster().cell(2, 2), Rgba::BLACK);
        assert!(!session.pending().contains(CellCoord::new(2, 3)));
    }
}
