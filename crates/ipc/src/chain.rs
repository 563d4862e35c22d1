//! Paint contract payloads: `PixelPlaced` logs in, `placePixels` calls out.
//!
//! Log fields arrive loosely typed. Depending on the provider a `uint16` or
//! `uint24` can be a JSON number, a decimal string or a `0x` hex string, so
//! everything is decoded and range-checked here before it reaches the canvas.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;

/// Largest value of the contract's `uint16` coordinates
pub const MAX_COORD: u64 = u16::MAX as u64;

/// Largest value of the contract's `uint24` color
pub const MAX_COLOR: u64 = 0xFF_FFFF;

/// Width of one ABI word in hex characters
const ABI_WORD_HEX: usize = 64;

/// An unsigned integer as some JSON-RPC providers encode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseUint {
    Number(u64),
    Text(String),
}

impl LooseUint {
    /// Decode to `u64`, accepting decimal and `0x`-prefixed hex text
    pub fn value(&self, field: &'static str) -> Result<u64, IpcError> {
        match self {
            LooseUint::Number(n) => Ok(*n),
            LooseUint::Text(text) => {
                let text = text.trim();
                let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => text.parse::<u64>(),
                };
                parsed.map_err(|_| {
                    IpcError::InvalidFormat(format!("field `{}`: {:?} is not an unsigned integer", field, text))
                })
            }
        }
    }

    fn bounded(&self, field: &'static str, max: u64) -> Result<u64, IpcError> {
        let value = self.value(field)?;
        if value > max {
            return Err(IpcError::OutOfRange { field, value, max });
        }
        Ok(value)
    }
}

impl From<u64> for LooseUint {
    fn from(value: u64) -> Self {
        LooseUint::Number(value)
    }
}

/// A `PixelPlaced(address indexed user, uint16 x, uint16 y, uint24 color)`
/// log as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPlacedLog {
    pub user: String,
    pub x: LooseUint,
    pub y: LooseUint,
    pub color: LooseUint,
    /// Position in the event stream, if the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<LooseUint>,
}

/// A `PixelPlaced` log with every field checked against its ABI width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPlaced {
    pub user: String,
    pub x: u16,
    pub y: u16,
    /// Packed `0xRRGGBB`
    pub color: u32,
    pub log_index: Option<u64>,
}

impl PixelPlacedLog {
    pub fn decode(&self) -> Result<PixelPlaced, IpcError> {
        Ok(PixelPlaced {
            user: self.user.clone(),
            x: self.x.bounded("x", MAX_COORD)? as u16,
            y: self.y.bounded("y", MAX_COORD)? as u16,
            color: self.color.bounded("color", MAX_COLOR)? as u32,
            log_index: self
                .log_index
                .as_ref()
                .map(|index| index.value("log_index"))
                .transpose()?,
        })
    }

    /// Build from the raw non-indexed `data` of an `eth_getLogs` entry: three
    /// 32-byte words holding `x`, `y` and `color`.
    pub fn from_abi_data(user: impl Into<String>, data: &str) -> Result<Self, IpcError> {
        let hex = data.trim().trim_start_matches("0x");
        if !hex.is_ascii() || hex.len() < 3 * ABI_WORD_HEX {
            return Err(IpcError::InvalidFormat(format!(
                "log data has {} hex digits, expected at least {}",
                hex.len(),
                3 * ABI_WORD_HEX
            )));
        }
        let word = |index: usize| -> Result<u64, IpcError> {
            let word = &hex[index * ABI_WORD_HEX..(index + 1) * ABI_WORD_HEX];
            let (high, low) = word.split_at(ABI_WORD_HEX - 16);
            if !high.chars().all(|c| c == '0') {
                return Err(IpcError::InvalidFormat(format!("ABI word {} overflows u64", index)));
            }
            u64::from_str_radix(low, 16)
                .map_err(|_| IpcError::InvalidFormat(format!("ABI word {} is not hex", index)))
        };
        Ok(Self {
            user: user.into(),
            x: word(0)?.into(),
            y: word(1)?.into(),
            color: word(2)?.into(),
            log_index: None,
        })
    }
}

/// A `PixelPlaced` entry exactly as `eth_getLogs` returns it.
///
/// `topics[0]` is the event signature and `topics[1]` the indexed `user`
/// padded to a word; `data` holds the `x`, `y` and `color` words. Other
/// fields of the entry are ignored. The entry's own `logIndex` counts
/// within its block, so it is not a stream position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogEntry {
    pub topics: Vec<String>,
    pub data: String,
}

impl RawLogEntry {
    /// The indexed `user` address as `0x` + 40 lowercase hex digits
    pub fn user(&self) -> Result<String, IpcError> {
        let topic = self
            .topics
            .get(1)
            .ok_or_else(|| IpcError::InvalidFormat("log has no indexed user topic".to_string()))?;
        let hex = topic.trim().trim_start_matches("0x");
        if hex.len() != ABI_WORD_HEX || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IpcError::InvalidFormat(format!(
                "user topic {:?} is not a 32-byte word",
                topic
            )));
        }
        Ok(format!("0x{}", hex[ABI_WORD_HEX - 40..].to_ascii_lowercase()))
    }

    pub fn to_pixel_placed(&self) -> Result<PixelPlacedLog, IpcError> {
        PixelPlacedLog::from_abi_data(self.user()?, &self.data)
    }
}

/// One entry of a log dump: raw from the node or already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRecord {
    Raw(RawLogEntry),
    Decoded(PixelPlacedLog),
}

impl LogRecord {
    pub fn into_pixel_placed(self) -> Result<PixelPlacedLog, IpcError> {
        match self {
            LogRecord::Raw(raw) => raw.to_pixel_placed(),
            LogRecord::Decoded(log) => Ok(log),
        }
    }
}

/// Arguments of `placePixels(uint16[] xs, uint16[] ys, uint24[] colors)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacePixelsCall {
    pub xs: Vec<u16>,
    pub ys: Vec<u16>,
    pub colors: Vec<u32>,
    /// Total price in token units
    pub cost: f64,
}

impl PlacePixelsCall {
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Columns must have equal length
    pub fn validate(&self) -> Result<(), IpcError> {
        if self.xs.len() != self.ys.len() || self.xs.len() != self.colors.len() {
            return Err(IpcError::InvalidFormat(format!(
                "column lengths differ: {} xs, {} ys, {} colors",
                self.xs.len(),
                self.ys.len(),
                self.colors.len()
            )));
        }
        if let Some(&color) = self.colors.iter().find(|&&c| c as u64 > MAX_COLOR) {
            return Err(IpcError::OutOfRange {
                field: "color",
                value: color as u64,
                max: MAX_COLOR,
            });
        }
        Ok(())
    }
}

/// How the submission collaborator finished with a `placePixels` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SubmissionOutcome {
    /// Mined successfully
    Confirmed,
    /// The user declined in the wallet
    Rejected { reason: String },
    /// Reverted or errored
    Failed { reason: String },
}

impl SubmissionOutcome {
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmissionOutcome::Confirmed)
    }
}
