// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scrollscribe.

use thiserror::Error;

/// Top-level error type for all Scrollscribe operations.
///
/// A transcription either succeeds completely or fails with exactly one of
/// these variants; a partial transcript is never returned.
#[derive(Debug, Error)]
pub enum ScribeError {
    // -- Input errors --
    #[error("image too small: height {height}px is below the {minimum}px minimum")]
    ImageTooSmall { height: u32, minimum: u32 },

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Planning --
    #[error(
        "chunk planning stopped at the safety limit: {planned} chunks cover {covered} of {total_height}px"
    )]
    PlanningSafetyLimitReached {
        planned: usize,
        covered: u32,
        total_height: u32,
    },

    // -- Per-chunk errors --
    #[error("preprocessing failed for chunk {index}: {reason}")]
    ImagePreprocessing { index: usize, reason: String },

    #[error("OCR engine error: {0}")]
    OcrEngine(String),

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR failed for chunk {index} after {attempts} attempts: {reason}")]
    OcrRecognition {
        index: usize,
        attempts: u32,
        reason: String,
    },

    // -- Runtime --
    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScribeError {
    /// Index of the chunk this error belongs to, when it is chunk-specific.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::ImagePreprocessing { index, .. } | Self::OcrRecognition { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScribeError>;
