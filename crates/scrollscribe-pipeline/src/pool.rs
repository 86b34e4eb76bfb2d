// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition worker pool: bounded concurrent preprocess + OCR per band.
//
// A dispatcher walks the plan in order and spawns one unit per band into a
// `JoinSet`, holding a semaphore permit for the unit's whole lifetime. Each
// unit runs its CPU work on the blocking pool and retries transient OCR
// failures with linear backoff.
//
// Fail fast: a unit that gives up raises the abort flag *before* its permit
// is released, so the dispatcher (which is waiting for that permit) sees the
// flag and stops spawning. Units already running are allowed to finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scrollscribe_core::{
    ChunkDescriptor, ChunkPlan, PipelineConfig, PreprocessConfig, RawChunkResult,
    RecognitionConfig, Result, ScribeError,
};
use scrollscribe_image::{OcrEngine, SourceImage, preprocess};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::retry::{RetryDecision, RetryPolicy, should_retry};

/// Runs preprocess + OCR for every band of a plan, at most `concurrency`
/// bands at a time.
#[derive(Clone)]
pub struct WorkerPool {
    engine: Arc<dyn OcrEngine>,
    preprocess: Arc<PreprocessConfig>,
    recognition: Arc<RecognitionConfig>,
    policy: RetryPolicy,
    concurrency: usize,
}

impl WorkerPool {
    pub fn new(engine: Arc<dyn OcrEngine>, config: &PipelineConfig) -> Self {
        Self {
            engine,
            preprocess: Arc::new(config.preprocess.clone()),
            recognition: Arc::new(config.recognition.clone()),
            policy: RetryPolicy::from_pool(&config.pool),
            concurrency: config.pool.concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Recognise every band in `plan`.
    ///
    /// Returns one result per band in ascending index order, regardless of
    /// completion order. All-or-nothing: the first terminal failure stops
    /// dispatch and is returned once in-flight bands have settled.
    #[instrument(skip_all, fields(
        chunks = plan.len(),
        concurrency = self.concurrency,
        engine = self.engine.name(),
    ))]
    pub async fn recognize_all(
        &self,
        source: Arc<SourceImage>,
        plan: &ChunkPlan,
    ) -> Result<Vec<RawChunkResult>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let abort = Arc::new(AtomicBool::new(false));
        let mut units: JoinSet<(usize, Result<String>)> = JoinSet::new();

        // -- Dispatch ---------------------------------------------------------

        let mut dispatched = 0usize;
        for descriptor in plan.descriptors() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| ScribeError::Worker(format!("semaphore closed: {}", err)))?;

            if abort.load(Ordering::Acquire) {
                warn!(
                    next_index = descriptor.index,
                    "Stopping dispatch after a failed chunk"
                );
                break;
            }

            let unit = ChunkUnit {
                descriptor: *descriptor,
                source: Arc::clone(&source),
                engine: Arc::clone(&self.engine),
                preprocess: Arc::clone(&self.preprocess),
                recognition: Arc::clone(&self.recognition),
                policy: self.policy,
            };
            let abort = Arc::clone(&abort);

            units.spawn(async move {
                let _permit = permit;
                let index = unit.descriptor.index;
                let result = unit.run().await;
                if result.is_err() {
                    abort.store(true, Ordering::Release);
                }
                (index, result)
            });
            dispatched += 1;
        }
        debug!(dispatched, "Dispatch finished");

        // -- Join -------------------------------------------------------------

        let mut slots: Vec<Option<String>> = vec![None; plan.len()];
        let mut first_error: Option<ScribeError> = None;

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((index, Ok(text))) => match slots.get_mut(index) {
                    Some(slot) => *slot = Some(text),
                    None => {
                        if first_error.is_none() {
                            first_error = Some(ScribeError::Worker(format!(
                                "chunk index {} is outside a plan of {} chunks",
                                index,
                                plan.len()
                            )));
                        }
                    }
                },
                Ok((index, Err(err))) => {
                    if first_error.is_none() {
                        error!(index, error = %err, "Chunk failed");
                        first_error = Some(err);
                    } else {
                        debug!(index, error = %err, "Additional chunk failure");
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(ScribeError::Worker(format!(
                            "recognition task failed: {}",
                            join_err
                        )));
                    }
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.map(|text| RawChunkResult { index, text }).ok_or_else(|| {
                    ScribeError::Worker(format!("chunk {} produced no result", index))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(chunks = results.len(), "All chunks recognised");
        Ok(results)
    }
}

/// Everything one band needs, owned so it can move onto a task.
struct ChunkUnit {
    descriptor: ChunkDescriptor,
    source: Arc<SourceImage>,
    engine: Arc<dyn OcrEngine>,
    preprocess: Arc<PreprocessConfig>,
    recognition: Arc<RecognitionConfig>,
    policy: RetryPolicy,
}

impl ChunkUnit {
    async fn run(self) -> Result<String> {
        let index = self.descriptor.index;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let outcome = tokio::task::spawn_blocking({
                let descriptor = self.descriptor;
                let source = Arc::clone(&self.source);
                let engine = Arc::clone(&self.engine);
                let preprocess_config = Arc::clone(&self.preprocess);
                let recognition = Arc::clone(&self.recognition);
                move || {
                    let buffer = preprocess(&source, &descriptor, &preprocess_config)?;
                    engine.recognize(&buffer, &recognition)
                }
            })
            .await
            .map_err(|err| ScribeError::Worker(format!("chunk {} task failed: {}", index, err)))?;

            let err = match outcome {
                Ok(text) => {
                    debug!(index, attempt, chars = text.len(), "Chunk recognised");
                    return Ok(text);
                }
                Err(err) => err,
            };

            match should_retry(&err, attempt, &self.policy) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        index,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Chunk recognition failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp(_) => return Err(err),
                RetryDecision::Exhausted => {
                    return Err(ScribeError::OcrRecognition {
                        index,
                        attempts: attempt,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
}
