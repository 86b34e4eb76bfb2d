// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract engine: runs the `tesseract` executable on a temporary PNG and
// reads the recognised text from stdout.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use scrollscribe_core::{RecognitionConfig, Result, ScribeError};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use super::OcrEngine;
use crate::preprocess::PreprocessedBuffer;

const DEFAULT_EXECUTABLE: &str = "tesseract";

/// Tesseract invoked as a subprocess, one process per band.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    executable: PathBuf,
    tessdata_dir: Option<PathBuf>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractCli {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            tessdata_dir: None,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Command-line arguments for one recognition of `input`.
    fn build_args(&self, input: &Path, options: &RecognitionConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![input.as_os_str().to_owned(), "stdout".into()];
        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".into());
            args.push(dir.as_os_str().to_owned());
        }
        args.extend(
            [
                "-l".to_string(),
                options.language.clone(),
                "--oem".to_string(),
                options.ocr_engine_mode.to_string(),
                "--psm".to_string(),
                options.page_segmentation_mode.to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip_all, fields(index = buffer.index(), engine = "tesseract"))]
    fn recognize(&self, buffer: &PreprocessedBuffer, options: &RecognitionConfig) -> Result<String> {
        let input = NamedTempFile::with_suffix(".png")?;
        buffer
            .image()
            .save(input.path())
            .map_err(|err| ScribeError::OcrEngine(format!("failed to write band image: {}", err)))?;

        let output = Command::new(&self.executable)
            .args(self.build_args(input.path(), options))
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ScribeError::EngineUnavailable(format!(
                        "cannot run {}: {}",
                        self.executable.display(),
                        err
                    ))
                }
                _ => ScribeError::OcrEngine(format!("failed to spawn tesseract: {}", err)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "Tesseract exited with failure");
            return Err(ScribeError::OcrEngine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "Tesseract recognition complete");
        Ok(text)
    }
}
