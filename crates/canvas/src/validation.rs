use thiserror::Error;

use crate::types::CellCoord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("Cell ({x}, {y}) is outside the {side}x{side} grid")]
    OutOfBounds { x: i64, y: i64, side: u32 },
    #[error("Event log gap: expected sequence {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },
    #[error("Replay prefix {prefix} exceeds log length {len}")]
    PrefixOutOfRange { prefix: usize, len: usize },
    #[error("Invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),
    #[error("Grid side {0} is not supported")]
    InvalidGridSize(u32),
    #[error("A submission is already in flight")]
    SubmissionInFlight,
    #[error("No submission is in flight")]
    NoSubmissionInFlight,
}

/// Validate a signed grid coordinate against a grid side
pub fn check_cell(side: u32, x: i64, y: i64) -> Result<CellCoord, CanvasError> {
    if x < 0 || y < 0 || x >= side as i64 || y >= side as i64 {
        return Err(CanvasError::OutOfBounds { x, y, side });
    }
    Ok(CellCoord::new(x as u32, y as u32))
}

/// Whether a signed grid coordinate lies inside a grid of the given side
#[inline]
pub fn in_grid(side: u32, x: i64, y: i64) -> bool {
    x >= 0 && y >= 0 && x < side as i64 && y < side as i64
}

/// Parse `#RRGGBB` into the packed `0xRRGGBB` form
pub fn parse_hex(hex: &str) -> Result<u32, CanvasError> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CanvasError::InvalidColor(hex.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| CanvasError::InvalidColor(hex.to_string()))
}
