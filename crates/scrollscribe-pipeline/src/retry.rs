// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry policy for band recognition, with linear backoff.
//
// Classifies errors into Transient (retry) and Permanent (give up). A
// permanent error is deterministic for the band, so repeating the attempt
// would only repeat the failure.

use std::time::Duration;

use scrollscribe_core::{ErrorClass, PoolConfig, ScribeError};
use tracing::{debug, info, warn};

/// How many attempts a band gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per band, the first one included.
    pub max_attempts: u32,
    /// The wait after failed attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_pool(&PoolConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_pool(config: &PoolConfig) -> Self {
        Self {
            max_attempts: config.retries.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry; the error is permanent.
    GiveUp(ErrorClass),
    /// Every allowed attempt has been used.
    Exhausted,
}

/// Classify a `ScribeError` into an `ErrorClass` for retry decisions.
pub fn classify_error(err: &ScribeError) -> ErrorClass {
    match err {
        // Transient: a single recognition call failed
        ScribeError::OcrEngine(_) => ErrorClass::Transient,
        ScribeError::Io(_) => ErrorClass::Transient,

        // Permanent: same input, same failure
        ScribeError::ImagePreprocessing { .. } => ErrorClass::Permanent,
        ScribeError::EngineUnavailable(_) => ErrorClass::Permanent,
        ScribeError::ImageTooSmall { .. } => ErrorClass::Permanent,
        ScribeError::ImageDecode(_) => ErrorClass::Permanent,
        ScribeError::InvalidConfig(_) => ErrorClass::Permanent,
        ScribeError::PlanningSafetyLimitReached { .. } => ErrorClass::Permanent,
        ScribeError::OcrRecognition { .. } => ErrorClass::Permanent,
        ScribeError::Worker(_) => ErrorClass::Permanent,
        ScribeError::Serialization(_) => ErrorClass::Permanent,
    }
}

/// Decide what to do after failed attempt number `attempt` (1-based).
pub fn should_retry(err: &ScribeError, attempt: u32, policy: &RetryPolicy) -> RetryDecision {
    match classify_error(err) {
        ErrorClass::Permanent => {
            info!(attempt, "permanent error, not retrying");
            RetryDecision::GiveUp(ErrorClass::Permanent)
        }
        ErrorClass::Transient => {
            if attempt >= policy.max_attempts {
                warn!(attempt, max = policy.max_attempts, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, policy);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// delay = base * attempt
fn compute_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    policy.base_delay.saturating_mul(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
        }
    }

    #[test]
    fn engine_failure_is_transient() {
        let err = ScribeError::OcrEngine("tesseract exited with 1".into());
        assert_eq!(classify_error(&err), ErrorClass::Transient);
    }

    #[test]
    fn preprocessing_and_missing_engine_are_permanent() {
        let err = ScribeError::ImagePreprocessing {
            index: 2,
            reason: "band exceeds image".into(),
        };
        assert_eq!(classify_error(&err), ErrorClass::Permanent);
        let err = ScribeError::EngineUnavailable("tesseract not found".into());
        assert_eq!(classify_error(&err), ErrorClass::Permanent);
    }

    #[test]
    fn retry_respects_max_attempts() {
        let p = policy(3, 1000);
        let err = ScribeError::OcrEngine("timeout".into());
        assert_eq!(
            should_retry(&err, 1, &p),
            RetryDecision::RetryAfter(Duration::from_millis(1000))
        );
        assert_eq!(
            should_retry(&err, 2, &p),
            RetryDecision::RetryAfter(Duration::from_millis(2000))
        );
        assert_eq!(should_retry(&err, 3, &p), RetryDecision::Exhausted);
    }

    #[test]
    fn single_attempt_policy_never_retries() {
        let err = ScribeError::OcrEngine("timeout".into());
        assert_eq!(should_retry(&err, 1, &policy(1, 10)), RetryDecision::Exhausted);
    }

    #[test]
    fn permanent_error_never_retries() {
        let err = ScribeError::EngineUnavailable("no binary".into());
        assert_eq!(
            should_retry(&err, 1, &RetryPolicy::default()),
            RetryDecision::GiveUp(ErrorClass::Permanent)
        );
    }

    #[test]
    fn delay_grows_linearly() {
        let p = policy(5, 250);
        assert_eq!(compute_delay(1, &p), Duration::from_millis(250));
        assert_eq!(compute_delay(2, &p), Duration::from_millis(500));
        assert_eq!(compute_delay(4, &p), Duration::from_millis(1000));
    }

    #[test]
    fn policy_from_pool_config() {
        let p = RetryPolicy::from_pool(&PoolConfig {
            concurrency: 2,
            retries: 4,
            retry_base_delay_ms: 50,
        });
        assert_eq!(p.max_attempts, 4);
        assert_eq!(p.base_delay, Duration::from_millis(50));
    }
}
