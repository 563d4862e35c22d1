//! Pointer and wheel handling for the session

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CanvasSession, PointerMode};
use crate::types::CellCoord;
use crate::validation::{check_cell, CanvasError};

/// Hover label shown while the pointer is off the grid
pub const HOVER_PLACEHOLDER: &str = "(---, ---)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer left the canvas or the gesture was interrupted
    Cancel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// One pointer sample in screen pixels relative to the canvas element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub button: PointerButton,
    /// Shift held: the primary button pans instead of painting
    #[serde(default)]
    pub shift: bool,
}

impl PointerSample {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            x,
            y,
            button: PointerButton::Primary,
            shift: false,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Whether a down with this sample starts a pan rather than a stroke
    #[inline]
    pub fn pans(&self) -> bool {
        self.shift || self.button != PointerButton::Primary
    }
}

impl CanvasSession {
    /// Feed one pointer sample.
    ///
    /// Primary down starts a stroke that stages every cell it crosses in the
    /// selected color; shift or any other button pans. A click (down and up
    /// without leaving the cell) on an already staged cell unstages it.
    /// Returns the number of newly staged cells. Painting while a submission is in flight fails
    /// with [`CanvasError::SubmissionInFlight`] and ends the stroke.
    pub fn handle_pointer(&mut self, sample: PointerSample) -> Result<usize, CanvasError> {
        let (gx, gy) = self.viewport.screen_to_grid(sample.x, sample.y);
        self.set_hover(match sample.phase {
            PointerPhase::Cancel => None,
            _ => check_cell(self.side(), gx, gy).ok(),
        });

        match sample.phase {
            PointerPhase::Down if sample.pans() => {
                self.finish_gesture();
                self.viewport.begin_drag(sample.x, sample.y);
                self.pointer = PointerMode::Panning;
                Ok(0)
            }
            PointerPhase::Down => {
                self.finish_gesture();
                if !self.overlay.mode().is_live() {
                    debug!("Ignoring stroke while {:?} overlay is shown", self.overlay.mode());
                    return Ok(0);
                }
                self.ensure_can_stage()?;
                self.pointer = PointerMode::Painting;
                self.press = check_cell(self.side(), gx, gy)
                    .ok()
                    .filter(|&cell| self.pending.contains(cell));
                let cells = self.stroke.begin(gx, gy);
                Ok(self.stage_cells(&cells))
            }
            PointerPhase::Move => match self.pointer {
                PointerMode::Panning => {
                    if self.viewport.drag_to(sample.x, sample.y) {
                        self.render_queue.request();
                    }
                    Ok(0)
                }
                PointerMode::Painting => {
                    if let Err(e) = self.ensure_can_stage() {
                        self.finish_gesture();
                        return Err(e);
                    }
                    if self
                        .press
                        .is_some_and(|cell| (cell.x as i64, cell.y as i64) != (gx, gy))
                    {
                        self.press = None;
                    }
                    let cells = self.stroke.extend(gx, gy);
                    Ok(self.stage_cells(&cells))
                }
                PointerMode::Idle => Ok(0),
            },
            PointerPhase::Up => {
                let click = self.press.take();
                self.finish_gesture();
                if let Some(cell) = click {
                    if self.pending.unstage(&mut self.raster, cell) {
                        debug!("Click unstaged ({}, {})", cell.x, cell.y);
                        self.render_queue.request();
                    }
                }
                Ok(0)
            }
            PointerPhase::Cancel => {
                self.finish_gesture();
                Ok(0)
            }
        }
    }

    /// One wheel step at a screen point (negative `delta_y` zooms in)
    pub fn handle_wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
        let before = (self.viewport.zoom(), self.viewport.origin());
        self.viewport.wheel(sx, sy, delta_y);
        if (self.viewport.zoom(), self.viewport.origin()) != before {
            self.render_queue.request();
        }
        let (gx, gy) = self.viewport.screen_to_grid(sx, sy);
        self.set_hover(check_cell(self.side(), gx, gy).ok());
    }

    /// Last in-grid cell under the pointer
    #[inline]
    pub fn hover(&self) -> Option<CellCoord> {
        self.hover
    }

    /// `(x, y)` of the hovered cell, or the placeholder off-grid
    pub fn hover_label(&self) -> String {
        match self.hover {
            Some(cell) => format!("({}, {})", cell.x, cell.y),
            None => HOVER_PLACEHOLDER.to_string(),
        }
    }

    fn set_hover(&mut self, hover: Option<CellCoord>) {
        if self.hover != hover {
            self.hover = hover;
            self.render_queue.request();
        }
    }

    /// Stage a cell in the selected color, or unstage it if it is staged.
    ///
    /// Returns whether the cell is staged afterwards.
    pub fn toggle_cell(&mut self, x: i64, y: i64) -> Result<bool, CanvasError> {
        self.ensure_can_stage()?;
        let cell = check_cell(self.side(), x, y)?;
        let staged = self.pending.toggle(&mut self.raster, cell, self.selected);
        self.render_queue.request();
        Ok(staged)
    }

    /// Drop one staged cell, restoring its original color.
    ///
    /// Returns whether the cell was staged.
    pub fn unstage_cell(&mut self, x: i64, y: i64) -> Result<bool, CanvasError> {
        self.ensure_can_stage()?;
        let cell = check_cell(self.side(), x, y)?;
        let removed = self.pending.unstage(&mut self.raster, cell);
        if removed {
            self.render_queue.request();
        }
        Ok(removed)
    }

    /// End a paint stroke without touching an ongoing pan
    pub(super) fn end_stroke(&mut self) {
        self.press = None;
        self.stroke.end();
        if self.pointer == PointerMode::Painting {
            self.pointer = PointerMode::Idle;
        }
    }

    fn finish_gesture(&mut self) {
        self.press = None;
        self.stroke.end();
        self.viewport.end_drag();
        self.pointer = PointerMode::Idle;
    }

    pub(super) fn ensure_can_stage(&self) -> Result<(), CanvasError> {
        if self.in_flight.is_some() {
            return Err(CanvasError::SubmissionInFlight);
        }
        Ok(())
    }

    pub(super) fn stage_cells(&mut self, cells: &[CellCoord]) -> usize {
        let mut staged = 0;
        for &cell in cells {
            if self.pending.stage(&mut self.raster, cell, self.selected) {
                staged += 1;
            }
        }
        if staged > 0 {
            self.render_queue.request();
        }
        staged
    }
}
