// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their translation into a pipeline config and
// an OCR engine.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, ValueEnum};
use scrollscribe_core::config::FAINT_TEXT_THRESHOLD_BOOST;
use scrollscribe_core::{PipelineConfig, Result};
use scrollscribe_image::{OcrEngine, TesseractCli};

/// Transcribe a tall screenshot into de-duplicated plain text.
#[derive(Debug, Parser)]
#[command(name = "scrollscribe", version, author, about)]
pub struct Cli {
    /// Screenshot to transcribe (PNG, JPEG, WebP, ...).
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// JSON configuration file; omitted fields keep their defaults.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Raise the binarization threshold for light-gray text.
    #[arg(long)]
    pub faint: bool,

    /// Recognition engine.
    #[arg(long, value_enum, default_value_t = EngineKind::Tesseract)]
    pub engine: EngineKind,

    /// Path to the tesseract executable.
    #[arg(long, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    /// Tesseract language data directory.
    #[arg(long, value_name = "DIR")]
    pub tessdata_dir: Option<PathBuf>,

    /// Directory holding the ocrs detection and recognition models.
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    Tesseract,
    Ocrs,
}

impl Cli {
    /// Default filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Defaults, overlaid with `--config`, then `--faint`.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if self.faint {
            config.preprocess.threshold_value = config
                .preprocess
                .threshold_value
                .saturating_add(FAINT_TEXT_THRESHOLD_BOOST);
        }
        Ok(config)
    }

    pub fn build_engine(&self) -> Result<Arc<dyn OcrEngine>> {
        match self.engine {
            EngineKind::Tesseract => {
                let mut engine = TesseractCli::new();
                if let Some(path) = &self.tesseract {
                    engine = engine.with_executable(path);
                }
                if let Some(dir) = &self.tessdata_dir {
                    engine = engine.with_tessdata_dir(dir);
                }
                Ok(Arc::new(engine))
            }
            EngineKind::Ocrs => build_ocrs(self.model_dir.as_deref()),
        }
    }
}

#[cfg(feature = "ocr")]
fn build_ocrs(model_dir: Option<&std::path::Path>) -> Result<Arc<dyn OcrEngine>> {
    use scrollscribe_image::{OcrsConfig, OcrsEngine};

    let config = model_dir.map(OcrsConfig::from_dir).unwrap_or_default();
    Ok(Arc::new(OcrsEngine::new(config)?))
}

#[cfg(not(feature = "ocr"))]
fn build_ocrs(_model_dir: Option<&std::path::Path>) -> Result<Arc<dyn OcrEngine>> {
    Err(scrollscribe_core::ScribeError::EngineUnavailable(
        "this build has no ocrs support; rebuild with `--features ocr`".into(),
    ))
}
