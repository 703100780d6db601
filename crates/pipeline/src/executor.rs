//! Ordered concurrent executor.
//!
//! Blocks are transformed by a fixed pool of worker tasks that claim work
//! through an atomic cursor. Completed outputs travel over a channel to the
//! coordinator, which restores source order by sorting on `original_index`
//! once every block has succeeded.
//!
//! The first block to exhaust its attempts fails the whole batch. When several
//! blocks fail concurrently, whichever records its failure first is reported;
//! across runs that choice is not deterministic.

use crate::error::{PipelineError, Result};
use crate::limits::{
    concurrency_from_env, max_attempts_from_env, retry_delay_ms_from_env, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
};
use headerdoc_block_extractor::CodeBlock;
use headerdoc_transformer::{TransformError, Transformer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// How often and how patiently a single block is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per block, first call included
    pub max_attempts: usize,
    /// Pause after a failed attempt
    pub delay: Duration,
    /// Delay multiplier per further attempt; `1.0` keeps the delay constant
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            backoff: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Pause to take after failed attempt number `attempt` (1-based)
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        if self.backoff <= 1.0 || attempt <= 1 || self.delay.is_zero() {
            return self.delay;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let secs = self.delay.as_secs_f64() * self.backoff.powi(exponent);
        // saturates instead of overflowing on long retry chains
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Knobs for one `process_blocks` batch
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorOptions {
    /// Maximum number of blocks transformed at the same time
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

impl ExecutorOptions {
    /// Defaults overridden by `HEADERDOC_CONCURRENCY`, `HEADERDOC_MAX_ATTEMPTS`
    /// and `HEADERDOC_RETRY_DELAY_MS`.
    pub fn from_env() -> Self {
        Self {
            concurrency: concurrency_from_env(),
            retry: RetryPolicy {
                max_attempts: max_attempts_from_env(),
                delay: Duration::from_millis(retry_delay_ms_from_env()),
                backoff: 1.0,
            },
        }
    }

    /// Validate options
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PipelineError::InvalidOptions(
                "concurrency must be > 0".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(PipelineError::InvalidOptions(
                "max_attempts must be > 0".to_string(),
            ));
        }
        if !self.retry.backoff.is_finite() || self.retry.backoff < 1.0 {
            return Err(PipelineError::InvalidOptions(format!(
                "backoff must be a finite number >= 1.0, got {}",
                self.retry.backoff
            )));
        }
        Ok(())
    }
}

/// Output of one successfully transformed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockResult {
    pub original_index: usize,
    pub output: String,
}

/// A block that used up all of its attempts
#[derive(Error, Debug)]
#[error("block {} failed after {attempts} attempt(s): {cause}", index + 1)]
pub struct BlockFailure {
    /// `original_index` of the failed block
    pub index: usize,
    pub attempts: usize,
    #[source]
    pub cause: TransformError,
}

/// Result of a whole batch
#[derive(Debug)]
pub enum FileOutcome {
    /// One output per input block, ordered by `original_index`
    Success(Vec<String>),
    Failure(BlockFailure),
}

impl FileOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> std::result::Result<Vec<String>, BlockFailure> {
        match self {
            Self::Success(outputs) => Ok(outputs),
            Self::Failure(failure) => Err(failure),
        }
    }
}

/// Single-assignment decision point: the first block to `record` its
/// exhaustion becomes the batch failure.
#[derive(Default)]
struct FailureCell(OnceLock<usize>);

impl FailureCell {
    fn record(&self, index: usize) -> bool {
        self.0.set(index).is_ok()
    }

    fn is_set(&self) -> bool {
        self.0.get().is_some()
    }
}

enum WorkerEvent {
    Completed(BlockResult),
    Failed(BlockFailure),
}

struct Batch {
    blocks: Vec<CodeBlock>,
    cursor: AtomicUsize,
    failure: FailureCell,
}

impl Batch {
    fn claim(&self) -> Option<&CodeBlock> {
        let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.blocks.get(position)
    }
}

enum Attempted {
    Done(String),
    Exhausted(BlockFailure),
    /// Another block already failed the batch; retries were abandoned
    Abandoned,
}

/// Transform every block with at most `options.concurrency` in flight.
///
/// Blocks are expected to carry `original_index` values `0..blocks.len()`, as
/// produced by `extract_blocks`. On success the outputs are returned in that
/// order; otherwise the failure of one exhausted block is returned and no
/// partial output is exposed.
pub async fn process_blocks(
    blocks: Vec<CodeBlock>,
    transformer: Arc<dyn Transformer>,
    options: &ExecutorOptions,
) -> FileOutcome {
    let total = blocks.len();
    if total == 0 {
        return FileOutcome::Success(Vec::new());
    }

    let workers = options.concurrency.clamp(1, total);
    let retry = RetryPolicy {
        max_attempts: options.retry.max_attempts.max(1),
        ..options.retry.clone()
    };
    log::debug!(
        "Transforming {total} blocks with {workers} workers via {}",
        transformer.name()
    );

    let batch = Arc::new(Batch {
        blocks,
        cursor: AtomicUsize::new(0),
        failure: FailureCell::default(),
    });
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<WorkerEvent>();

    let mut tasks = JoinSet::new();
    for worker_id in 0..workers {
        tasks.spawn(run_worker(
            worker_id,
            Arc::clone(&batch),
            Arc::clone(&transformer),
            retry.clone(),
            event_tx.clone(),
        ));
    }
    drop(event_tx);

    let mut results: Vec<BlockResult> = Vec::with_capacity(total);
    let mut failure = None;
    while let Some(event) = event_rx.recv().await {
        match event {
            WorkerEvent::Completed(result) => {
                log::info!(
                    "Block {} of {total} completed ({} done)",
                    result.original_index + 1,
                    results.len() + 1
                );
                results.push(result);
            }
            WorkerEvent::Failed(exhausted) => failure = Some(exhausted),
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            log::error!("Worker task failed: {err}");
        }
    }

    if let Some(failure) = failure {
        return FileOutcome::Failure(failure);
    }

    assemble(results, total)
}

/// Sort by `original_index` and check that exactly `0..total` is present.
fn assemble(mut results: Vec<BlockResult>, total: usize) -> FileOutcome {
    results.sort_by_key(|result| result.original_index);

    let gap = (0..total).find(|&expected| {
        results
            .get(expected)
            .map_or(true, |result| result.original_index != expected)
    });
    if let Some(index) = gap.or_else(|| (results.len() != total).then_some(total)) {
        return FileOutcome::Failure(BlockFailure {
            index,
            attempts: 0,
            cause: TransformError::other(format!(
                "no result collected for block {} of {total}",
                index + 1
            )),
        });
    }

    FileOutcome::Success(results.into_iter().map(|result| result.output).collect())
}

async fn run_worker(
    worker_id: usize,
    batch: Arc<Batch>,
    transformer: Arc<dyn Transformer>,
    retry: RetryPolicy,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    let total = batch.blocks.len();
    while !batch.failure.is_set() {
        let Some(block) = batch.claim() else {
            break;
        };

        match transform_with_retry(block, transformer.as_ref(), &retry, &batch.failure, total)
            .await
        {
            Attempted::Done(output) => {
                let result = BlockResult {
                    original_index: block.original_index,
                    output,
                };
                if events.send(WorkerEvent::Completed(result)).is_err() {
                    break;
                }
            }
            Attempted::Exhausted(failure) => {
                if batch.failure.record(failure.index) {
                    log::error!(
                        "Block {} of {total} exhausted its retries",
                        failure.index + 1
                    );
                    let _ = events.send(WorkerEvent::Failed(failure));
                }
                break;
            }
            Attempted::Abandoned => break,
        }
    }
    log::trace!("Worker {worker_id} finished");
}

async fn transform_with_retry(
    block: &CodeBlock,
    transformer: &dyn Transformer,
    retry: &RetryPolicy,
    failure: &FailureCell,
    total: usize,
) -> Attempted {
    let number = block.original_index + 1;
    let mut attempt = 1;
    loop {
        match transformer.transform(&block.text).await {
            Ok(output) => return Attempted::Done(output),
            Err(err) if attempt < retry.max_attempts => {
                log::warn!(
                    "Error processing block {number} of {total} (attempt {attempt}/{}): {err}",
                    retry.max_attempts
                );
                tokio::time::sleep(retry.delay_for(attempt)).await;
                if failure.is_set() {
                    return Attempted::Abandoned;
                }
                attempt += 1;
            }
            Err(err) => {
                log::warn!(
                    "All {attempt} attempts failed for block {number} of {total}: {err}"
                );
                return Attempted::Exhausted(BlockFailure {
                    index: block.original_index,
                    attempts: attempt,
                    cause: err,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(index: usize) -> BlockResult {
        BlockResult {
            original_index: index,
            output: format!("doc {index}"),
        }
    }

    #[test]
    fn assemble_restores_order() {
        let outcome = assemble(vec![result(2), result(0), result(1)], 3);
        assert_eq!(
            outcome.into_result().unwrap(),
            vec!["doc 0", "doc 1", "doc 2"]
        );
    }

    #[test]
    fn assemble_reports_lowest_missing_index() {
        let outcome = assemble(vec![result(2), result(0)], 3);
        let failure = outcome.into_result().unwrap_err();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.attempts, 0);
    }

    #[test]
    fn failure_cell_keeps_first_writer() {
        let cell = FailureCell::default();
        assert!(!cell.is_set());
        assert!(cell.record(4));
        assert!(!cell.record(1));
        assert!(cell.is_set());
        assert_eq!(cell.0.get(), Some(&4));
    }

    #[test]
    fn constant_delay_by_default() {
        let policy = RetryPolicy {
            delay: Duration::from_millis(100),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(5), Duration::from_millis(100));
    }

    #[test]
    fn backoff_grows_delay() {
        let policy = RetryPolicy {
            max_attempts: 4,
            delay: Duration::from_millis(100),
            backoff: 2.0,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn backoff_saturates_on_long_retry_chains() {
        let policy = RetryPolicy {
            max_attempts: 100,
            delay: Duration::from_secs(1),
            backoff: 2.0,
        };
        assert_eq!(policy.delay_for(100), Duration::MAX);
        assert_eq!(policy.delay_for(i32::MAX as usize + 10), Duration::MAX);

        let instant = RetryPolicy {
            delay: Duration::ZERO,
            ..policy
        };
        assert_eq!(instant.delay_for(2000), Duration::ZERO);
    }

    #[test]
    fn options_validation() {
        assert!(ExecutorOptions::default().validate().is_ok());

        let mut options = ExecutorOptions::default();
        options.concurrency = 0;
        assert!(options.validate().is_err());

        let mut options = ExecutorOptions::default();
        options.retry.max_attempts = 0;
        assert!(options.validate().is_err());

        let mut options = ExecutorOptions::default();
        options.retry.backoff = 0.5;
        assert!(options.validate().is_err());
    }

    #[test]
    fn failure_message_uses_one_based_numbering() {
        let failure = BlockFailure {
            index: 0,
            attempts: 3,
            cause: TransformError::EmptyResponse,
        };
        assert_eq!(
            failure.to_string(),
            "block 1 failed after 3 attempt(s): Service returned no content"
        );
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_workers() {
        struct Unreachable;

        #[async_trait::async_trait]
        impl Transformer for Unreachable {
            fn name(&self) -> &str {
                "unreachable"
            }

            async fn transform(&self, _text: &str) -> headerdoc_transformer::Result<String> {
                panic!("no block to transform");
            }
        }

        let options = ExecutorOptions::default();
        let outcome = process_blocks(Vec::new(), Arc::new(Unreachable), &options).await;
        assert_eq!(outcome.into_result().unwrap(), Vec::<String>::new());
    }
}
