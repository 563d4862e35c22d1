use serde::{Deserialize, Serialize};

use crate::constants::OPAQUE;
use crate::validation::{parse_hex, CanvasError};

/// An 8-bit RGBA color, laid out exactly like one cell of the raster
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[repr(C)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const RED: Rgba = Rgba::opaque(255, 0, 0);
    pub const YELLOW: Rgba = Rgba::opaque(255, 255, 0);

    /// Fully opaque color from its channels
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: OPAQUE }
    }

    /// Decode the packed `0xRRGGBB` form used by the paint contract
    pub const fn from_uint24(packed: u32) -> Self {
        Self::opaque(
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        )
    }

    /// Pack into `0xRRGGBB`, dropping alpha
    pub const fn to_uint24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, CanvasError> {
        parse_hex(hex).map(Self::from_uint24)
    }

    /// Format as uppercase `#RRGGBB`
    pub fn to_hex(self) -> String {
        format!("#{:06X}", self.to_uint24())
    }

    /// Same color with alpha forced to opaque
    #[inline]
    pub const fn with_opaque_alpha(self) -> Self {
        Self::opaque(self.r, self.g, self.b)
    }
}

/// Integer cell address inside the grid (`0 <= x, y < side`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Packed row-major key, unique per cell for a given grid side
    #[inline]
    pub const fn pack(self, side: u32) -> u64 {
        self.y as u64 * side as u64 + self.x as u64
    }

    /// Inverse of [`CellCoord::pack`]
    #[inline]
    pub const fn unpack(key: u64, side: u32) -> Self {
        Self {
            x: (key % side as u64) as u32,
            y: (key / side as u64) as u32,
        }
    }
}

/// The swatches offered by the color picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        let colors = pixelburn_config::DEFAULT_PALETTE
            .iter()
            .filter_map(|hex| Rgba::from_hex(hex).ok())
            .collect();
        Self { colors }
    }
}

impl Palette {
    /// Parse a list of `#RRGGBB` strings
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, CanvasError> {
        let colors = entries
            .iter()
            .map(|hex| Rgba::from_hex(hex.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Option<Rgba> {
        self.colors.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint24_packing() {
        let color = Rgba::from_uint24(0x12_34_56);
        assert_eq!(color, Rgba::opaque(0x12, 0x34, 0x56));
        assert_eq!(color.to_uint24(), 0x12_34_56);
        // Bits above 24 are ignored
        assert_eq!(Rgba::from_uint24(0xff00_00ff), Rgba::opaque(0, 0, 0xff));
    }

    #[test]
    fn test_hex_round_trip() {
        let color = Rgba::from_hex("#ff8800").unwrap();
        assert_eq!(color, Rgba::opaque(0xff, 0x88, 0x00));
        assert_eq!(color.to_hex(), "#FF8800");
        assert!(Rgba::from_hex("#ff88").is_err());
    }

    #[test]
    fn test_rgba_is_four_bytes() {
        let cells = [Rgba::WHITE, Rgba::opaque(1, 2, 3)];
        let bytes: &[u8] = bytemuck::cast_slice(&cells);
        assert_eq!(bytes, &[255, 255, 255, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn test_cell_pack_unique() {
        let side = 7;
        let mut keys = std::collections::HashSet::new();
        for y in 0..side {
            for x in 0..side {
                let key = CellCoord::new(x, y).pack(side);
                assert_eq!(CellCoord::unpack(key, side), CellCoord::new(x, y));
                assert!(keys.insert(key));
            }
        }
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 12);
        assert_eq!(palette.get(0), Some(Rgba::WHITE));
        assert_eq!(palette.get(3), Some(Rgba::BLACK));
    }

    #[test]
    fn test_palette_parse_rejects_garbage() {
        assert!(Palette::parse(&["#FFFFFF", "nope"]).is_err());
    }
}
