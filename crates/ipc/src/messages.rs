//! Message enums exchanged between the host page and the canvas core.

use serde::{Deserialize, Serialize};

use crate::chain::{PlacePixelsCall, SubmissionOutcome};
use crate::input::PointerInput;

/// Messages from the host page to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputMessage {
    /// Pointer sample over the canvas element
    Pointer(PointerInput),

    /// Mouse wheel at a screen point
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// Canvas element resized
    Resize { width: u32, height: u32 },

    /// Toolbar and keyboard commands
    Command(CanvasCommand),
}

/// Overlay selection as named by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlaySelection {
    Live,
    Heatmap,
    Replay { prefix: usize },
}

/// Commands from the toolbar and hotkeys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CanvasCommand {
    /// Pick a color as `#RRGGBB`
    SelectColor { hex: String },

    /// Pick a palette swatch
    SelectPalette { index: usize },

    /// Switch the displayed overlay
    SetOverlay { mode: OverlaySelection },

    /// Heatmap on/off
    ToggleHeatmap,

    /// Scrub the time-replay slider
    SetReplayPrefix { prefix: usize },

    /// Stage a cell in the selected color, or unstage it if staged
    ToggleCell { x: u32, y: u32 },

    /// Drop one staged cell
    Unstage { x: u32, y: u32 },

    /// Submit the staged pixels
    Commit,

    /// Drop the staged pixels
    Cancel,

    /// Settle the submission in flight
    Resolve { outcome: SubmissionOutcome },
}

/// Messages from the canvas to the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CanvasToHost {
    /// Hovered cell label changed, e.g. `(12, 40)` or `(---, ---)`
    HoverChanged { label: String },

    /// Staged set changed
    PendingChanged { count: usize, cost: f64 },

    /// Staged pixels were committed and should be submitted
    SubmissionRequested(PlacePixelsCall),

    /// The in-flight submission was settled
    SubmissionResolved { outcome: SubmissionOutcome, cells: usize },

    /// Total pixels ever placed
    PixelCount { total: usize },

    /// Error notification
    Error { code: String, message: String },
}
