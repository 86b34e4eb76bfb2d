// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.
//
// One immutable record built per transcription and passed down to every
// stage. Library crates never read configuration from the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScribeError};

/// Threshold increase applied by [`PipelineConfig::faint_text`].
pub const FAINT_TEXT_THRESHOLD_BOOST: u8 = 22;

/// Band layout for the chunk planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum height of one band in pixels.
    pub max_chunk_height: u32,
    /// Pixels shared between consecutive bands.
    pub overlap: u32,
    /// A tail shorter than this is absorbed into the previous band.
    pub min_last_chunk: u32,
    /// Safety cap on the number of planned bands.
    pub max_chunks: usize,
    /// Continue with a truncated plan (logged as a warning) instead of failing.
    pub accept_partial_coverage: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_height: 1000,
            overlap: 200,
            min_last_chunk: 500,
            max_chunks: 100,
            accept_partial_coverage: false,
        }
    }
}

/// Per-band image preprocessing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Working width every band is resized to.
    pub resize_width: u32,
    /// Binarization threshold (0-255); pixels at or above become white.
    pub threshold_value: u8,
    /// Linear gain applied on the [0,1] intensity scale.
    pub contrast_multiplier: f32,
    /// Linear offset applied on the [0,1] intensity scale.
    pub brightness_offset: f32,
    /// Gaussian sigma of the unsharp mask.
    pub sharpen_sigma: f32,
    /// Unsharp amount for flat (low-detail) areas.
    pub sharpen_flat_amount: f32,
    /// Unsharp amount for jagged (high-detail) areas.
    pub sharpen_jagged_amount: f32,
    /// Median filter radius applied after binarization.
    pub median_radius: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            resize_width: 1024,
            threshold_value: 128,
            contrast_multiplier: 1.8,
            brightness_offset: -0.3,
            sharpen_sigma: 2.0,
            sharpen_flat_amount: 1.5,
            sharpen_jagged_amount: 1.0,
            median_radius: 2,
        }
    }
}

/// Worker pool sizing and retry behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of bands recognised at the same time.
    pub concurrency: usize,
    /// Total OCR attempts per band before giving up.
    pub retries: u32,
    /// Backoff base; the wait after attempt `n` is `base * n`.
    pub retry_base_delay_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

/// Fuzzy merge parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Lines shorter than this (in characters) are never treated as duplicates.
    pub min_line_length: usize,
    /// Normalized edit distance below which two lines count as the same line.
    pub similarity_threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_line_length: 6,
            similarity_threshold: 0.2,
        }
    }
}

/// Options handed to the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognition language code (Tesseract `-l`).
    pub language: String,
    /// Tesseract `--oem` value.
    pub ocr_engine_mode: u8,
    /// Tesseract `--psm` value.
    pub page_segmentation_mode: u8,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            ocr_engine_mode: 1,
            page_segmentation_mode: 6,
        }
    }
}

/// Complete configuration for one transcription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    pub preprocess: PreprocessConfig,
    pub pool: PoolConfig,
    pub merge: MergeConfig,
    pub recognition: RecognitionConfig,
}

impl PipelineConfig {
    /// Variant for light-gray text on light backgrounds: raises the
    /// binarization threshold so faint strokes survive.
    pub fn faint_text() -> Self {
        let mut config = Self::default();
        config.preprocess.threshold_value = config
            .preprocess
            .threshold_value
            .saturating_add(FAINT_TEXT_THRESHOLD_BOOST);
        config
    }

    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Check every field range. Planning relies on these to terminate.
    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.max_chunk_height == 0 {
            return Err(invalid("chunking.max_chunk_height must be positive"));
        }
        if c.overlap >= c.max_chunk_height {
            return Err(invalid(format!(
                "chunking.overlap ({}) must be smaller than max_chunk_height ({})",
                c.overlap, c.max_chunk_height
            )));
        }
        if c.min_last_chunk > c.max_chunk_height {
            return Err(invalid(format!(
                "chunking.min_last_chunk ({}) must not exceed max_chunk_height ({})",
                c.min_last_chunk, c.max_chunk_height
            )));
        }
        if c.max_chunks == 0 {
            return Err(invalid("chunking.max_chunks must be at least 1"));
        }

        let p = &self.preprocess;
        if p.resize_width == 0 {
            return Err(invalid("preprocess.resize_width must be positive"));
        }
        if !p.contrast_multiplier.is_finite() || p.contrast_multiplier <= 0.0 {
            return Err(invalid("preprocess.contrast_multiplier must be a positive number"));
        }
        if !p.brightness_offset.is_finite() {
            return Err(invalid("preprocess.brightness_offset must be finite"));
        }
        if !p.sharpen_sigma.is_finite() || p.sharpen_sigma <= 0.0 {
            return Err(invalid("preprocess.sharpen_sigma must be a positive number"));
        }
        if !p.sharpen_flat_amount.is_finite()
            || !p.sharpen_jagged_amount.is_finite()
            || p.sharpen_flat_amount < 0.0
            || p.sharpen_jagged_amount < 0.0
        {
            return Err(invalid("preprocess sharpen amounts must be finite and not negative"));
        }

        if self.pool.concurrency == 0 {
            return Err(invalid("pool.concurrency must be at least 1"));
        }
        if self.pool.retries == 0 {
            return Err(invalid("pool.retries must be at least 1"));
        }

        let m = &self.merge;
        if !(0.0..=1.0).contains(&m.similarity_threshold) {
            return Err(invalid("merge.similarity_threshold must be within [0, 1]"));
        }

        if self.recognition.language.trim().is_empty() {
            return Err(invalid("recognition.language must not be empty"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ScribeError {
    ScribeError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn faint_text_raises_threshold() {
        let faint = PipelineConfig::faint_text();
        assert_eq!(faint.preprocess.threshold_value, 150);
        faint.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(
            r#"{ "chunking": { "overlap": 150 }, "pool": { "concurrency": 8 } }"#,
        )
        .unwrap();
        assert_eq!(config.chunking.overlap, 150);
        assert_eq!(config.chunking.max_chunk_height, 1000);
        assert_eq!(config.pool.concurrency, 8);
        assert_eq!(config.pool.retries, 3);
        assert_eq!(config.recognition.language, "eng");
    }

    #[test]
    fn overlap_must_be_below_chunk_height() {
        let mut config = PipelineConfig::default();
        config.chunking.overlap = 1000;
        assert!(matches!(
            config.validate(),
            Err(ScribeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut config = PipelineConfig::default();
        config.pool.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_sharpen_amount_rejected() {
        let mut config = PipelineConfig::default();
        config.preprocess.sharpen_flat_amount = f32::NAN;
        assert!(matches!(config.validate(), Err(ScribeError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.preprocess.sharpen_jagged_amount = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ScribeError::InvalidConfig(_))));
    }

    #[test]
    fn invalid_json_values_rejected_on_load() {
        let err = PipelineConfig::from_json(r#"{ "merge": { "similarity_threshold": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, ScribeError::InvalidConfig(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "recognition": { "language": "kor" } }"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.recognition.language, "kor");
    }
}
