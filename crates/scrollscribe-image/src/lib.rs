// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scrollscribe-image: Everything that touches pixels.
//
// Loads the source screenshot, plans the overlapping bands, turns each band
// into a binarized buffer, and hands buffers to an OCR engine (Tesseract on
// the command line, or `ocrs` behind the `ocr` feature).

pub mod image;
pub mod ocr;
pub mod planner;
pub mod preprocess;

// Re-export the primary items so callers can use `scrollscribe_image::plan_chunks` etc.
pub use crate::image::SourceImage;
pub use ocr::{OcrEngine, TesseractCli};
pub use planner::plan_chunks;
pub use preprocess::{PreprocessedBuffer, preprocess};

#[cfg(feature = "ocr")]
pub use ocr::{OcrsConfig, OcrsEngine};
