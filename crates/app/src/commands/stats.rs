//! `stats`: totals, top authors and the most contested cell of a log

use std::io::Write;

use canvas::{reconstruct, CellCoord, EventLog, Heatmap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStats {
    pub total_placed: usize,
    /// Cells differing from the background after the full log
    pub lit: usize,
    pub authors: usize,
    /// Most active authors, highest count first, ties by address
    pub top_authors: Vec<(String, usize)>,
    /// Most overwritten cell and how often it was painted
    pub hottest: Option<(CellCoord, u32)>,
}

impl LogStats {
    pub fn collect(log: &EventLog, top: usize) -> anyhow::Result<Self> {
        let raster = reconstruct(log, log.len())?;
        let counts = log.author_counts();

        let mut ranked: Vec<(String, usize)> = counts
            .iter()
            .map(|(author, count)| (author.to_string(), *count))
            .collect();
        // BTreeMap order breaks ties by address
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(top);

        Ok(Self {
            total_placed: log.total_placed(),
            lit: raster.lit_count(),
            authors: counts.len(),
            top_authors: ranked,
            hottest: Heatmap::from_log(log).hottest(),
        })
    }

    pub fn print<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "pixels placed: {}", self.total_placed)?;
        writeln!(out, "cells lit:     {}", self.lit)?;
        writeln!(out, "authors:       {}", self.authors)?;
        if let Some((cell, count)) = self.hottest {
            writeln!(out, "hottest cell:  ({}, {}) x{}", cell.x, cell.y, count)?;
        }
        for (rank, (author, count)) in self.top_authors.iter().enumerate() {
            writeln!(out, "{:>3}. {} {}", rank + 1, author, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas::{PaintEvent, Rgba};

    fn log() -> EventLog {
        let placements = [
            (0, 0, "0xb"),
            (1, 0, "0xa"),
            (0, 0, "0xb"),
            (2, 2, "0xa"),
            (3, 3, "0xc"),
        ];
        let events = placements
            .into_iter()
            .enumerate()
            .map(|(i, (x, y, author))| PaintEvent::new(x, y, Rgba::WHITE, author, i as u64));
        EventLog::from_events(4, events).unwrap()
    }

    #[test]
    fn test_collect() {
        let stats = LogStats::collect(&log(), 2).unwrap();
        assert_eq!(stats.total_placed, 5);
        assert_eq!(stats.lit, 4);
        assert_eq!(stats.authors, 3);
        assert_eq!(
            stats.top_authors,
            vec![("0xa".to_string(), 2), ("0xb".to_string(), 2)]
        );
        assert_eq!(stats.hottest, Some((CellCoord::new(0, 0), 2)));
    }

    #[test]
    fn test_empty_log() {
        let stats = LogStats::collect(&EventLog::new(4), 10).unwrap();
        assert_eq!(stats.total_placed, 0);
        assert_eq!(stats.lit, 0);
        assert!(stats.top_authors.is_empty());
        assert_eq!(stats.hottest, None);
    }

    #[test]
    fn test_print() {
        let mut out = Vec::new();
        LogStats::collect(&log(), 1).unwrap().print(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("pixels placed: 5"));
        assert!(text.contains("hottest cell:  (0, 0) x2"));
        assert!(text.contains("  1. 0xa 2"));
    }
}
