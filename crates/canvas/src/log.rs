//! Paint event log and the views derived from it.
//!
//! This module provides:
//! - [`EventLog`] - Append-only, gap-checked sequence of [`PaintEvent`]s
//! - [`replay`] - Time-travel reconstruction of the grid at any prefix
//! - [`Heatmap`] - Per-cell overwrite counts rendered through a gradient
//!
//! ## Ordering
//!
//! Events carry a `sequence` number that must equal their position in the
//! log. A log is only meaningful for replay when it has no gaps: replaying
//! the full log from an all-black grid reproduces the authoritative grid, and
//! a missing event would silently produce a different picture. Gaps are
//! therefore rejected on append rather than tolerated.

mod heatmap;
pub mod replay;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CellCoord, Rgba};
use crate::validation::{check_cell, CanvasError};

pub use heatmap::{heat_color, Heatmap};
pub use replay::{reconstruct, replay_events, ReplayCursor};

/// One historical paint from the authoritative event source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintEvent {
    pub x: u32,
    pub y: u32,
    pub color: Rgba,
    pub author: String,
    pub sequence: u64,
}

impl PaintEvent {
    pub fn new(x: u32, y: u32, color: Rgba, author: impl Into<String>, sequence: u64) -> Self {
        Self {
            x,
            y,
            color: color.with_opaque_alpha(),
            author: author.into(),
            sequence,
        }
    }

    #[inline]
    pub fn cell(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }
}

/// Ordered, append-only paint event log for a grid of fixed side.
pub struct EventLog {
    side: u32,
    events: Vec<PaintEvent>,
    listeners: Vec<Box<dyn Fn(&PaintEvent)>>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("side", &self.side)
            .field("event_count", &self.events.len())
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl EventLog {
    /// Create an empty log for a grid of the given side
    pub fn new(side: u32) -> Self {
        Self {
            side,
            events: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Build a log from an externally sourced sequence, validating every event
    pub fn from_events<I>(side: u32, events: I) -> Result<Self, CanvasError>
    where
        I: IntoIterator<Item = PaintEvent>,
    {
        let mut log = Self::new(side);
        for event in events {
            log.append(event)?;
        }
        debug!("Loaded event log with {} events", log.len());
        Ok(log)
    }

    /// Append an event.
    ///
    /// The event's sequence must equal the current length and its cell must
    /// be inside the grid. Listeners are notified after the append.
    pub fn append(&mut self, event: PaintEvent) -> Result<(), CanvasError> {
        let expected = self.events.len() as u64;
        if event.sequence != expected {
            return Err(CanvasError::SequenceGap {
                expected,
                found: event.sequence,
            });
        }
        check_cell(self.side, event.x as i64, event.y as i64)?;

        self.events.push(event);
        if let Some(event) = self.events.last() {
            for listener in &self.listeners {
                listener(event);
            }
        }
        Ok(())
    }

    /// Register a callback invoked for every successfully appended event
    pub fn listen<F>(&mut self, listener: F)
    where
        F: Fn(&PaintEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Drop every event, keeping registered listeners
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Sequence number the next appended event must carry
    #[inline]
    pub fn next_sequence(&self) -> u64 {
        self.events.len() as u64
    }

    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[inline]
    pub fn events(&self) -> &[PaintEvent] {
        &self.events
    }

    /// First `k` events (`k` must not exceed the length)
    pub fn prefix(&self, k: usize) -> Result<&[PaintEvent], CanvasError> {
        self.events.get(..k).ok_or(CanvasError::PrefixOutOfRange {
            prefix: k,
            len: self.events.len(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pixels ever placed (the log length)
    #[inline]
    pub fn total_placed(&self) -> usize {
        self.events.len()
    }

    /// Events per author, sorted by author
    pub fn author_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.author.as_str()).or_insert(0) += 1;
        }
        counts
    }
}
