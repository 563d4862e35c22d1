//! Boundary message protocol for pixelburn
//!
//! Defines the messages exchanged between the host page, the paint contract
//! event source and the canvas core. Everything here is plain serde data;
//! conversion into canvas types happens in the binary.

pub mod chain;
pub mod error;
pub mod input;
pub mod messages;

pub use chain::*;
pub use error::IpcError;
pub use input::*;
pub use messages::*;
