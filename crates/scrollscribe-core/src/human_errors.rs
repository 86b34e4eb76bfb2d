// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for whoever submitted the screenshot.
//
// Every technical error is mapped to plain English with a suggestion, often
// a configuration change worth trying on the next run.

use crate::error::ScribeError;

/// Severity of an error from the caller's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Engine hiccup; running again unchanged may work.
    Transient,
    /// Running again with a different configuration may work.
    Reconfigure,
    /// The input itself cannot be transcribed.
    Permanent,
    /// The OCR engine is missing or misinstalled.
    Setup,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What to try next.
    pub suggestion: String,
    /// Whether re-running (possibly reconfigured) can help.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScribeError` into a `HumanError`.
pub fn humanize_error(err: &ScribeError) -> HumanError {
    match err {
        ScribeError::ImageTooSmall { height, minimum } => HumanError {
            message: "This screenshot is too small to read.".into(),
            suggestion: format!(
                "Capture a taller region. The image is {height}px tall; at least {minimum}px is needed."
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScribeError::ImageDecode(_) => HumanError {
            message: "The screenshot couldn't be opened.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScribeError::InvalidConfig(detail) => HumanError {
            message: "The configuration is not valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            retriable: true,
            severity: Severity::Reconfigure,
        },

        ScribeError::PlanningSafetyLimitReached { covered, total_height, .. } => HumanError {
            message: "The screenshot is taller than the chunk limit allows.".into(),
            suggestion: format!(
                "Only {covered} of {total_height}px would be read. Raise max_chunks or max_chunk_height, \
                 or set accept_partial_coverage to keep a partial transcript."
            ),
            retriable: true,
            severity: Severity::Reconfigure,
        },

        ScribeError::ImagePreprocessing { index, .. } => HumanError {
            message: format!("Part {} of the screenshot couldn't be prepared for reading.", index + 1),
            suggestion: "Try a smaller max_chunk_height or resize_width, or re-capture the screenshot.".into(),
            retriable: true,
            severity: Severity::Reconfigure,
        },

        ScribeError::OcrEngine(_) => HumanError {
            message: "Text recognition hit a temporary problem.".into(),
            suggestion: "Run the transcription again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScribeError::OcrRecognition { index, attempts, .. } => HumanError {
            message: format!(
                "Text recognition failed on part {} after {attempts} tries.",
                index + 1
            ),
            suggestion: "Try again with a lower resize_width or a smaller max_chunk_height.".into(),
            retriable: true,
            severity: Severity::Reconfigure,
        },

        ScribeError::EngineUnavailable(detail) => HumanError {
            message: "The text recognition engine isn't available.".into(),
            suggestion: format!("Install the OCR engine or its models, then try again. ({detail})"),
            retriable: false,
            severity: Severity::Setup,
        },

        ScribeError::Worker(_) => HumanError {
            message: "A background worker stopped unexpectedly.".into(),
            suggestion: "Run the transcription again. Lower pool.concurrency if it keeps happening.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScribeError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::Permanent,
                }
            } else {
                HumanError {
                    message: "A file couldn't be read or written.".into(),
                    suggestion: format!("Check permissions and free disk space. ({io_err})"),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScribeError::Serialization(_) => HumanError {
            message: "The configuration file couldn't be parsed.".into(),
            suggestion: "Make sure the file is valid JSON.".into(),
            retriable: true,
            severity: Severity::Reconfigure,
        },
    }
}
