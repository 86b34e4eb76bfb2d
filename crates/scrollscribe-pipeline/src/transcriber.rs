// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transcriber: the end-to-end entry point.
//
// screenshot → plan bands → recognise bands concurrently → normalize each
// band → merge into one transcript.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scrollscribe_core::{PipelineConfig, Result, ScribeError};
use scrollscribe_image::{OcrEngine, SourceImage, plan_chunks};
use scrollscribe_text::{merge, normalize};
use tracing::{info, instrument, warn};

use crate::pool::WorkerPool;

/// Turns a tall screenshot into a single de-duplicated transcript.
///
/// Holds a validated configuration and a shared OCR engine; one
/// `Transcriber` can serve any number of images.
#[derive(Clone)]
pub struct Transcriber {
    config: PipelineConfig,
    pool: WorkerPool,
}

impl Transcriber {
    /// Validates `config` up front so a bad value fails before any work.
    pub fn new(engine: Arc<dyn OcrEngine>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(engine, &config);
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transcribe an already-decoded screenshot.
    #[instrument(skip_all, fields(width = source.width(), height = source.height()))]
    pub async fn transcribe(&self, source: SourceImage) -> Result<String> {
        source.ensure_min_height()?;

        let plan = plan_chunks(source.height(), &self.config.chunking);
        if plan.is_truncated() {
            if !self.config.chunking.accept_partial_coverage {
                return Err(ScribeError::PlanningSafetyLimitReached {
                    planned: plan.len(),
                    covered: plan.covered_height(),
                    total_height: plan.total_height(),
                });
            }
            warn!(
                covered = plan.covered_height(),
                total_height = plan.total_height(),
                "Transcribing a partially covered image"
            );
        }
        info!(chunks = plan.len(), "Chunk plan ready");

        let raw = self.pool.recognize_all(Arc::new(source), &plan).await?;

        let normalized: Vec<String> = raw.iter().map(|chunk| normalize(&chunk.text)).collect();
        let transcript = merge(&normalized, &self.config.merge);

        info!(
            chunks = normalized.len(),
            lines = transcript.lines().count(),
            chars = transcript.len(),
            "Transcription complete"
        );
        Ok(transcript)
    }

    /// Decode the file at `path` and transcribe it.
    pub async fn transcribe_path(&self, path: impl AsRef<Path>) -> Result<String> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let source = tokio::task::spawn_blocking(move || SourceImage::open(&path))
            .await
            .map_err(|err| ScribeError::Worker(format!("image decode task failed: {}", err)))??;
        self.transcribe(source).await
    }

    /// Decode encoded image bytes and transcribe them.
    pub async fn transcribe_bytes(&self, data: Vec<u8>) -> Result<String> {
        let source = tokio::task::spawn_blocking(move || SourceImage::from_bytes(&data))
            .await
            .map_err(|err| ScribeError::Worker(format!("image decode task failed: {}", err)))??;
        self.transcribe(source).await
    }
}
