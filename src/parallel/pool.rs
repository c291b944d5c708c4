//! Fixed-size worker pool over bounded crossbeam queues
//!
//! Workers are spawned into a scope owned by the caller. Each pulls jobs until
//! the job queue closes and pushes one result per job.

use crossbeam::channel::{Receiver, Sender, bounded};
use crossbeam::thread::Scope;
use std::sync::Arc;

/// Upper bound on worker threads, whatever was requested
pub const MAX_WORKERS: usize = 1024;

/// Fixed set of worker threads draining a bounded job queue
///
/// The pool does not own its threads' lifetime: [`WorkerPool::start`] spawns
/// into a caller-provided `crossbeam::thread::scope`, so jobs and processors
/// may borrow from the caller and a panicking worker surfaces as the scope's
/// error when it joins.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    queue_capacity: usize,
    span: tracing::Span,
}

/// Everything one worker thread needs
struct WorkerContext<T, R, F> {
    worker_id: usize,
    job_rx: Receiver<T>,
    result_tx: Sender<R>,
    processor: Arc<F>,
    span: tracing::Span,
}

impl WorkerPool {
    /// A worker count of 0 means one worker per CPU
    pub fn new(workers: usize, span: tracing::Span) -> Self {
        let workers = resolve_workers(workers);
        Self {
            workers,
            queue_capacity: workers.saturating_mul(2),
            span,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Bound of both the job and the result queue
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Spawn the workers and hand back the two ends the caller drives
    ///
    /// Each job is processed exactly once. The result queue closes once the
    /// returned job sender (and every clone of it) is dropped and all workers
    /// have drained the remaining jobs.
    pub fn start<'env, T, R, F>(
        &self,
        scope: &Scope<'env>,
        processor: F,
    ) -> (Sender<T>, Receiver<R>)
    where
        T: Send + 'env,
        R: Send + 'env,
        F: Fn(T) -> R + Send + Sync + 'env,
    {
        let (job_tx, job_rx) = bounded::<T>(self.queue_capacity);
        let (result_tx, result_rx) = bounded::<R>(self.queue_capacity);
        let processor = Arc::new(processor);

        tracing::debug!(
            parent: &self.span,
            "Starting worker pool with {} workers (queue capacity {})",
            self.workers,
            self.queue_capacity
        );

        for worker_id in 0..self.workers {
            let ctx = WorkerContext {
                worker_id,
                job_rx: job_rx.clone(),
                result_tx: result_tx.clone(),
                processor: Arc::clone(&processor),
                span: tracing::debug_span!(parent: &self.span, "worker", id = worker_id),
            };
            scope.spawn(move |_| worker_thread(ctx));
        }

        // Only the workers keep these alive from here on
        drop(job_rx);
        drop(result_tx);

        (job_tx, result_rx)
    }
}

/// Turn a requested worker count into the number of threads to spawn
///
/// 0 resolves to the CPU count; anything above [`MAX_WORKERS`] is clamped.
pub fn resolve_workers(requested: usize) -> usize {
    let workers = if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    };
    if workers > MAX_WORKERS {
        tracing::warn!(
            "Requested {} workers, limiting to {}",
            workers,
            MAX_WORKERS
        );
    }
    workers.min(MAX_WORKERS)
}

fn worker_thread<T, R, F>(ctx: WorkerContext<T, R, F>)
where
    F: Fn(T) -> R,
{
    let _entered = ctx.span.enter();
    tracing::trace!("Worker {} started", ctx.worker_id);

    let mut processed = 0usize;
    while let Ok(job) = ctx.job_rx.recv() {
        let result = (ctx.processor)(job);
        processed += 1;
        if ctx.result_tx.send(result).is_err() {
            tracing::debug!("Result receiver dropped, worker {} stopping", ctx.worker_id);
            break;
        }
    }

    tracing::info!("Worker {} processed {} files", ctx.worker_id, processed);
}
