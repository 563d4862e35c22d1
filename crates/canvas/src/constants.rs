/// Zoom factor applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.15;

/// Cell boundaries are only worth drawing from this zoom upwards.
pub const GRID_LINE_MIN_ZOOM: f64 = 8.0;

/// Alpha value written for every cell. The grid has no transparent state.
pub const OPAQUE: u8 = 255;

/// Minimum alpha for an imported image pixel to be staged.
pub const IMPORT_ALPHA_THRESHOLD: u8 = 128;

/// Bytes per cell in the backing store (R, G, B, A).
pub const CHANNELS: usize = 4;
