// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scrollscribe-text: per-band normalization of raw OCR text, and the fuzzy
// merge that turns ordered band texts into one transcript.

pub mod merge;
pub mod normalize;
pub mod rules;
pub mod similarity;

pub use merge::merge;
pub use normalize::normalize;
pub use rules::{NOISE_RULES, SYMBOL_RANGES};
pub use similarity::{levenshtein, normalized_distance};
