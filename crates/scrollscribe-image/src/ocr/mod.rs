// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engines: the recognition seam between preprocessed bands and text.
//
// The pipeline only ever talks to `dyn OcrEngine`, so tests can substitute
// a scripted engine and deployments can pick Tesseract or the pure-Rust
// `ocrs` engine (behind the `ocr` feature).

pub mod tesseract;

#[cfg(feature = "ocr")]
pub mod ocrs_engine;

use scrollscribe_core::{RecognitionConfig, Result};

use crate::preprocess::PreprocessedBuffer;

pub use tesseract::TesseractCli;

#[cfg(feature = "ocr")]
pub use ocrs_engine::{OcrsConfig, OcrsEngine};

/// Text recognition over a preprocessed band.
///
/// Implementations are called from blocking worker threads, possibly
/// several at once, and must be safe to share.
///
/// Errors:
/// - [`ScribeError::EngineUnavailable`](scrollscribe_core::ScribeError::EngineUnavailable)
///   when the engine cannot run at all (not retried).
/// - [`ScribeError::OcrEngine`](scrollscribe_core::ScribeError::OcrEngine)
///   for a failed recognition attempt (retried by the pool).
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Recognise the text in `buffer`. Lines are separated by `\n`.
    fn recognize(&self, buffer: &PreprocessedBuffer, options: &RecognitionConfig)
    -> Result<String>;
}
