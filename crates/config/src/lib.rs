//! Shared configuration for pixelburn
//!
//! This crate provides the single source of truth for the canvas grid size,
//! the viewport dimensions, zoom limits and per-pixel pricing shared by the
//! canvas core and the command-line tool.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default grid side in cells
pub const DEFAULT_GRID_SIZE: u32 = 1000;

/// Largest grid side addressable by the uint16 coordinates of the paint contract
pub const MAX_GRID_SIZE: u32 = 65536;

/// Default viewport width in screen pixels
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default viewport height in screen pixels
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

/// Default minimum zoom (screen pixels per cell)
pub const DEFAULT_MIN_ZOOM: f64 = 0.5;

/// Default maximum zoom (screen pixels per cell)
pub const DEFAULT_MAX_ZOOM: f64 = 40.0;

/// Default dirty-tracking tile size in cells
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Default token cost of one committed cell
pub const DEFAULT_COST_PER_PIXEL: f64 = 1.0;

/// Default swatches offered by the color picker
pub const DEFAULT_PALETTE: [&str; 12] = [
    "#FFFFFF", "#C0C0C0", "#808080", "#000000", "#FF0000", "#FF8800", "#FFFF00", "#00FF00",
    "#00FFFF", "#0088FF", "#0000FF", "#FF00FF",
];

/// Environment variable overriding [`CanvasConfig::grid_size`]
pub const ENV_GRID_SIZE: &str = "PIXELBURN_GRID_SIZE";

/// Environment variable overriding the viewport size, formatted `WIDTHxHEIGHT`
pub const ENV_VIEWPORT: &str = "PIXELBURN_VIEWPORT";

/// Environment variable overriding [`CanvasConfig::cost_per_pixel`]
pub const ENV_COST_PER_PIXEL: &str = "PIXELBURN_COST_PER_PIXEL";

/// Errors raised while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Canvas configuration shared by the core and the binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Side of the square grid in cells
    pub grid_size: u32,
    /// Viewport width in screen pixels
    pub viewport_width: u32,
    /// Viewport height in screen pixels
    pub viewport_height: u32,
    /// Lower zoom bound (screen pixels per cell)
    pub min_zoom: f64,
    /// Upper zoom bound (screen pixels per cell)
    pub max_zoom: f64,
    /// Dirty-tracking tile size in cells
    pub tile_size: u32,
    /// Token cost of a single committed cell
    pub cost_per_pixel: f64,
    /// Color picker swatches as `#RRGGBB`
    pub palette: Vec<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            tile_size: DEFAULT_TILE_SIZE,
            cost_per_pixel: DEFAULT_COST_PER_PIXEL,
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CanvasConfig {
    /// Create a config for a grid of the given side with default everything else
    pub fn with_grid_size(grid_size: u32) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Defaults overlaid with the `PIXELBURN_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in production).
    ///
    /// Malformed values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_GRID_SIZE) {
            match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 && size <= MAX_GRID_SIZE => self.grid_size = size,
                _ => warn!("Ignoring {}={:?}: expected 1..={}", ENV_GRID_SIZE, raw, MAX_GRID_SIZE),
            }
        }

        if let Some(raw) = lookup(ENV_VIEWPORT) {
            match parse_dimensions(&raw) {
                Some((width, height)) => {
                    self.viewport_width = width;
                    self.viewport_height = height;
                }
                None => warn!("Ignoring {}={:?}: expected WIDTHxHEIGHT", ENV_VIEWPORT, raw),
            }
        }

        if let Some(raw) = lookup(ENV_COST_PER_PIXEL) {
            match raw.trim().parse::<f64>() {
                Ok(cost) if cost.is_finite() && cost >= 0.0 => self.cost_per_pixel = cost,
                _ => warn!("Ignoring {}={:?}: expected a non-negative number", ENV_COST_PER_PIXEL, raw),
            }
        }
    }

    /// Check the invariants the canvas core relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be in 1..={}, got {}",
                MAX_GRID_SIZE, self.grid_size
            )));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".to_string()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid("tile_size must be non-zero".to_string()));
        }
        if !(self.cost_per_pixel.is_finite() && self.cost_per_pixel >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cost_per_pixel must be a non-negative number, got {}",
                self.cost_per_pixel
            )));
        }
        Ok(())
    }
}

/// Parse `WIDTHxHEIGHT` into non-zero dimensions
fn parse_dimensions(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}
