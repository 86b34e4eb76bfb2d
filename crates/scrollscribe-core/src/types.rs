// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scrollscribe transcription pipeline.

use serde::{Deserialize, Serialize};

/// Images shorter than this are rejected before planning.
pub const MIN_SOURCE_HEIGHT: u32 = 100;

/// One horizontal band of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    /// Position in top-to-bottom order.
    pub index: usize,
    /// Pixel offset of the band's first row.
    pub top: u32,
    /// Band height in pixels.
    pub height: u32,
}

impl ChunkDescriptor {
    /// First row below the band (exclusive end).
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

impl std::fmt::Display for ChunkDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} [{}, {})", self.index, self.top, self.bottom())
    }
}

/// The ordered set of bands planned for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPlan {
    descriptors: Vec<ChunkDescriptor>,
    total_height: u32,
    truncated: bool,
}

impl ChunkPlan {
    pub fn new(descriptors: Vec<ChunkDescriptor>, total_height: u32, truncated: bool) -> Self {
        Self {
            descriptors,
            total_height,
            truncated,
        }
    }

    pub fn descriptors(&self) -> &[ChunkDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Height of the image the plan was computed for.
    pub fn total_height(&self) -> u32 {
        self.total_height
    }

    /// True when the chunk cap stopped planning before the image bottom.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Bottom edge of the last planned band.
    pub fn covered_height(&self) -> u32 {
        self.descriptors.last().map(ChunkDescriptor::bottom).unwrap_or(0)
    }
}

/// Raw OCR output for one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChunkResult {
    pub index: usize,
    pub text: String,
}

/// Retry classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// May succeed on another attempt (engine hiccup, timeout).
    Transient,
    /// Deterministic; another attempt reproduces it.
    Permanent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covered_height_is_last_bottom() {
        let plan = ChunkPlan::new(
            vec![
                ChunkDescriptor { index: 0, top: 0, height: 1000 },
                ChunkDescriptor { index: 1, top: 800, height: 700 },
            ],
            1500,
            false,
        );
        assert_eq!(plan.covered_height(), 1500);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn empty_plan_covers_nothing() {
        let plan = ChunkPlan::new(Vec::new(), 0, false);
        assert!(plan.is_empty());
        assert_eq!(plan.covered_height(), 0);
    }

    #[test]
    fn descriptor_display() {
        let d = ChunkDescriptor { index: 2, top: 1600, height: 900 };
        assert_eq!(d.to_string(), "#2 [1600, 2500)");
    }
}
