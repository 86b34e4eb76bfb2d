// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scrollscribe-pipeline: Bounded concurrent band recognition with retry,
// and the `Transcriber` that runs planning, recognition, normalization and
// merge end to end.

pub mod pool;
pub mod retry;
pub mod transcriber;

pub use pool::WorkerPool;
pub use retry::{RetryDecision, RetryPolicy, classify_error, should_retry};
pub use transcriber::Transcriber;
