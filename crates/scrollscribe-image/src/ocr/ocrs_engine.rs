// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pure-Rust OCR engine backed by `ocrs` neural network models run via `rten`.
//
// Only compiled with the `ocr` feature. The engine needs two model files:
//
// - `text-detection.rten`
// - `text-recognition.rten`
//
// `ocrs-cli` downloads them to `$XDG_CACHE_HOME/ocrs` (usually
// `~/.cache/ocrs`) on first run, which is where [`OcrsConfig::default`]
// looks for them.
//
// The `ocrs` and `rten` crates must be compiled in release mode; debug
// builds are 10-100x slower.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine as OcrsInner, OcrEngineParams};
use rten::Model;
use scrollscribe_core::{RecognitionConfig, Result, ScribeError};
use tracing::{debug, info, instrument};

use super::OcrEngine;
use crate::preprocess::PreprocessedBuffer;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two `ocrs` model files.
#[derive(Debug, Clone)]
pub struct OcrsConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrsConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrsConfig {
    /// Both models inside `dir` under their well-known filenames.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn from_paths(
        detection_model: impl Into<PathBuf>,
        recognition_model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            detection_model_path: detection_model.into(),
            recognition_model_path: recognition_model.into(),
        }
    }

    /// Missing model files make the engine unavailable, not merely failing.
    pub fn validate(&self) -> Result<()> {
        for (role, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(ScribeError::EngineUnavailable(format!(
                    "{} model not found at {}; run `ocrs-cli` once to download models",
                    role,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// `ocrs` engine with its models loaded once and shared across bands.
pub struct OcrsEngine {
    engine: OcrsInner,
}

impl OcrsEngine {
    /// Load both models. This is the expensive step; build one engine and
    /// reuse it.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrsConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            ScribeError::EngineUnavailable(format!(
                "failed to load detection model from {}: {}",
                config.detection_model_path.display(),
                err
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                ScribeError::EngineUnavailable(format!(
                    "failed to load recognition model from {}: {}",
                    config.recognition_model_path.display(),
                    err
                ))
            })?;

        let engine = OcrsInner::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            ScribeError::EngineUnavailable(format!("failed to initialise ocrs: {}", err))
        })?;

        info!("ocrs engine ready");
        Ok(Self { engine })
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(OcrsConfig::from_dir(dir))
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    /// `ocrs` has a fixed model set; the Tesseract-specific options are ignored.
    #[instrument(skip_all, fields(index = buffer.index(), engine = "ocrs"))]
    fn recognize(&self, buffer: &PreprocessedBuffer, _options: &RecognitionConfig) -> Result<String> {
        let rgb = image::DynamicImage::ImageLuma8(buffer.image().clone()).to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            ScribeError::OcrEngine(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| ScribeError::OcrEngine(format!("ocrs input preparation failed: {}", err)))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| ScribeError::OcrEngine(format!("ocrs recognition failed: {}", err)))?;

        debug!(lines = text.lines().count(), "ocrs recognition complete");
        Ok(text)
    }
}
