//! pixelburn canvas core - raster, viewport and staged edits
//!
//! This crate provides the in-memory core of the burn-to-paint pixel canvas:
//! - [`raster::RasterStore`] - Flat RGBA grid with dirty-tile tracking
//! - [`viewport::Viewport`] - Pan/zoom and screen to grid mapping
//! - [`stroke`] - Bresenham interpolation of pointer drags
//! - [`pending::PendingEdits`] - Staged cells with exact restoration
//! - [`log`] - Append-only paint event log, heatmap and time replay
//! - [`render`] - Display surface seam and frame coalescing
//! - [`session::CanvasSession`] - Explicit per-session state tying it together
//!
//! Chain submission, wallet handling and on-screen drawing live outside
//! this crate; it only consumes and produces in-memory data.

pub mod constants;
pub mod log;
pub mod overlay;
pub mod pending;
pub mod raster;
pub mod render;
pub mod session;
pub mod stroke;
pub mod types;
pub mod validation;
pub mod viewport;

pub use constants::*;
pub use log::*;
pub use overlay::*;
pub use pending::*;
pub use raster::*;
pub use render::*;
pub use session::*;
pub use stroke::*;
pub use types::*;
pub use validation::*;
pub use viewport::*;
