// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chunk planner: splits a tall image into overlapping horizontal bands.
//
// Bands are at most `max_chunk_height` tall and consecutive bands share
// `overlap` rows. A tail shorter than `min_last_chunk` is folded into the
// band above it so the last band is never too thin to recognise or to
// compare against during the merge.

use scrollscribe_core::{ChunkDescriptor, ChunkPlan, ChunkingConfig};
use tracing::{debug, instrument, warn};

/// Plan the bands covering `[0, total_height)`.
///
/// The config is expected to have passed `PipelineConfig::validate`; with an
/// unvalidated config the planner still terminates but bands may not overlap
/// as requested.
#[instrument(skip(config), fields(
    max_chunk_height = config.max_chunk_height,
    overlap = config.overlap,
    min_last_chunk = config.min_last_chunk,
))]
pub fn plan_chunks(total_height: u32, config: &ChunkingConfig) -> ChunkPlan {
    if total_height == 0 {
        return ChunkPlan::new(Vec::new(), 0, false);
    }

    // No split needed.
    if total_height <= config.max_chunk_height {
        debug!("Image fits in a single chunk");
        return ChunkPlan::new(
            vec![ChunkDescriptor {
                index: 0,
                top: 0,
                height: total_height,
            }],
            total_height,
            false,
        );
    }

    let mut descriptors: Vec<ChunkDescriptor> = Vec::new();
    let mut truncated = false;
    let mut y = 0u32;

    while y < total_height {
        if descriptors.len() >= config.max_chunks {
            truncated = true;
            break;
        }

        let mut height = config.max_chunk_height.min(total_height - y);

        // Absorb an undersized tail into this chunk.
        let remaining = total_height - (y + height);
        if remaining > 0 && remaining < config.min_last_chunk {
            height = total_height - y;
        }

        descriptors.push(ChunkDescriptor {
            index: descriptors.len(),
            top: y,
            height,
        });

        if y + height >= total_height {
            break;
        }

        // Always at least one row of progress.
        y += height.saturating_sub(config.overlap).max(1);
    }

    if truncated {
        warn!(
            planned = descriptors.len(),
            covered = descriptors.last().map(ChunkDescriptor::bottom).unwrap_or(0),
            total_height,
            "Chunk planning hit max_chunks before covering the image"
        );
    } else {
        debug!(chunks = descriptors.len(), "Chunk plan computed");
    }

    ChunkPlan::new(descriptors, total_height, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(max: u32, overlap: u32, min_last: u32) -> ChunkingConfig {
        ChunkingConfig {
            max_chunk_height: max,
            overlap,
            min_last_chunk: min_last,
            ..Default::default()
        }
    }

    fn spans(plan: &ChunkPlan) -> Vec<(u32, u32)> {
        plan.descriptors().iter().map(|d| (d.top, d.height)).collect()
    }

    fn assert_full_coverage(plan: &ChunkPlan, total_height: u32) {
        let ds = plan.descriptors();
        assert!(!ds.is_empty());
        assert_eq!(ds[0].top, 0, "plan must start at the top edge");
        for pair in ds.windows(2) {
            assert!(
                pair[0].bottom() >= pair[1].top,
                "gap between {} and {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(ds.last().unwrap().bottom(), total_height);
        for (i, d) in ds.iter().enumerate() {
            assert_eq!(d.index, i);
        }
    }

    #[test]
    fn worked_example_2500px() {
        let plan = plan_chunks(2500, &config(1000, 200, 500));
        assert_eq!(spans(&plan), vec![(0, 1000), (800, 1000), (1600, 900)]);
        assert!(!plan.is_truncated());
        assert_full_coverage(&plan, 2500);
    }

    #[test]
    fn short_image_is_one_chunk() {
        let plan = plan_chunks(1000, &config(1000, 200, 500));
        assert_eq!(spans(&plan), vec![(0, 1000)]);

        let plan = plan_chunks(350, &config(1000, 200, 500));
        assert_eq!(spans(&plan), vec![(0, 350)]);
    }

    #[test]
    fn undersized_tail_is_absorbed() {
        // 0..1000, then 800..1800 would leave a 300px tail; it is folded in.
        let plan = plan_chunks(2100, &config(1000, 200, 500));
        assert_eq!(spans(&plan), vec![(0, 1000), (800, 1300)]);
        assert_full_coverage(&plan, 2100);
    }

    #[test]
    fn tail_just_above_minimum_gets_its_own_chunk() {
        // After 0..1000 the remaining 500px is not below the minimum.
        let plan = plan_chunks(1500, &config(1000, 200, 500));
        assert_eq!(spans(&plan), vec![(0, 1000), (800, 700)]);
    }

    #[test]
    fn first_chunk_absorbs_short_remainder() {
        let plan = plan_chunks(1100, &config(1000, 200, 500));
        assert_eq!(spans(&plan), vec![(0, 1100)]);
    }

    #[test]
    fn safety_cap_truncates_and_flags() {
        let mut cfg = config(1000, 200, 500);
        cfg.max_chunks = 2;
        let plan = plan_chunks(10_000, &cfg);
        assert_eq!(plan.len(), 2);
        assert!(plan.is_truncated());
        assert_eq!(plan.covered_height(), 1800);
    }

    #[test]
    fn cap_reached_exactly_at_bottom_is_not_truncated() {
        let mut cfg = config(1000, 200, 500);
        cfg.max_chunks = 3;
        let plan = plan_chunks(2500, &cfg);
        assert_eq!(plan.len(), 3);
        assert!(!plan.is_truncated());
    }

    #[test]
    fn zero_height_plans_nothing() {
        assert!(plan_chunks(0, &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn unvalidated_overlap_still_terminates() {
        let plan = plan_chunks(3000, &config(100, 100, 0));
        assert!(plan.len() <= ChunkingConfig::default().max_chunks);
    }

    proptest! {
        #[test]
        fn plans_cover_without_gaps(
            total in 100u32..20_000,
            max in 200u32..2000,
            overlap_pct in 0u32..50,
            min_last_pct in 0u32..100,
        ) {
            let overlap = max * overlap_pct / 100;
            let min_last = max * min_last_pct / 100;
            let mut cfg = config(max, overlap, min_last);
            cfg.max_chunks = usize::MAX;
            let plan = plan_chunks(total, &cfg);

            assert_full_coverage(&plan, total);
            for pair in plan.descriptors().windows(2) {
                prop_assert_eq!(pair[0].bottom() - pair[1].top, overlap);
            }
        }

        #[test]
        fn no_undersized_chunks_on_tall_images(
            max in 200u32..2000,
            overlap_pct in 0u32..50,
            min_last_pct in 0u32..100,
            extra in 1u32..20_000,
        ) {
            let overlap = max * overlap_pct / 100;
            let min_last = max * min_last_pct / 100;
            let total = max + min_last + extra;
            let mut cfg = config(max, overlap, min_last);
            cfg.max_chunks = usize::MAX;
            let plan = plan_chunks(total, &cfg);

            for d in plan.descriptors() {
                prop_assert!(d.height >= min_last, "chunk {} shorter than {}", d, min_last);
            }
        }

        #[test]
        fn single_chunk_when_image_fits(max in 100u32..4000, frac in 1u32..=100) {
            let total = (max * frac / 100).max(1);
            let plan = plan_chunks(total, &config(max, max / 5, max / 2));
            prop_assert_eq!(spans(&plan), vec![(0, total)]);
        }
    }
}
