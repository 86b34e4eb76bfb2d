// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge / de-duplicator: stitches normalized band texts into one
// transcript, dropping lines that were recognised twice in the overlap
// between adjacent bands.
//
// Only the immediately preceding band is consulted. Bands further apart do
// not share pixels, so a repeat there is real content (a review quoted
// twice, say) and is kept.

use scrollscribe_core::MergeConfig;
use tracing::{debug, instrument};

use crate::similarity::normalized_distance;

/// Join band texts in order, removing overlap duplicates.
///
/// A single band is returned unchanged; no bands give an empty string.
#[instrument(skip_all, fields(chunks = chunks.len()))]
pub fn merge(chunks: &[String], config: &MergeConfig) -> String {
    let Some((first, rest)) = chunks.split_first() else {
        return String::new();
    };

    let mut merged = first.clone();
    let mut reference: Vec<&str> = first.lines().collect();
    let mut dropped_total = 0usize;

    for chunk in rest {
        let lines: Vec<&str> = chunk.lines().collect();
        let survivors: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|line| !is_overlap_duplicate(line, &reference, config))
            .collect();
        dropped_total += lines.len() - survivors.len();

        let block = survivors.join("\n");
        let block = block.trim_matches('\n');
        if !block.trim().is_empty() {
            if !merged.is_empty() {
                merged.push_str("\n\n");
            }
            merged.push_str(block);
        }

        // The whole band, duplicates included, is what the next band overlaps.
        reference = lines;
    }

    debug!(dropped = dropped_total, "Chunks merged");
    merged
}

fn is_overlap_duplicate(line: &str, reference: &[&str], config: &MergeConfig) -> bool {
    if line.chars().count() < config.min_line_length {
        return false;
    }
    reference
        .iter()
        .any(|previous| normalized_distance(line, previous) < config.similarity_threshold)
}
