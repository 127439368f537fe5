//! Bounded worker pool that drives jobs through the detection provider.

use super::types::{BatchJob, BatchStatus, ImageInput, JobStatus};
use crate::core::cache::{ContentCache, ContentKey};
use crate::core::provider::{AnalysisResult, DetectionProvider};
use crate::error::BatchError;
use crate::events::{BatchCounts, BatchEvent, Event, EventSender};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Message recorded on jobs removed by [`BatchScheduler::cancel_all`]
pub const CANCELLED_MESSAGE: &str = "Cancelled by user";

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of jobs processing at once
    pub max_concurrent: usize,
    /// Store successful provider verdicts in the attached cache
    pub populate_cache: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            populate_cache: true,
        }
    }
}

/// Builder for [`BatchScheduler`]
pub struct BatchSchedulerBuilder {
    config: SchedulerConfig,
    provider: Option<Arc<dyn DetectionProvider>>,
    cache: Option<Arc<ContentCache>>,
    events: EventSender,
}

impl BatchSchedulerBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            provider: None,
            cache: None,
            events: EventSender::default(),
        }
    }

    /// Set the worker budget
    pub fn max_concurrent(mut self, workers: usize) -> Self {
        self.config.max_concurrent = workers;
        self
    }

    /// Whether provider verdicts are written back to the cache
    pub fn populate_cache(mut self, populate: bool) -> Self {
        self.config.populate_cache = populate;
        self
    }

    /// Set the detection provider (required)
    pub fn provider(mut self, provider: Arc<dyn DetectionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Consult this cache before calling the provider
    pub fn cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Report job transitions on an event channel
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the workers
    pub fn build(self) -> Result<BatchScheduler, BatchError> {
        let provider = self.provider.ok_or(BatchError::MissingProvider)?;
        BatchScheduler::start(self.config, provider, self.cache, self.events)
    }
}

impl Default for BatchSchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A job claimed by a worker
struct Claim {
    job_id: String,
    input: Arc<ImageInput>,
}

/// What a worker learned while processing a claim
struct Outcome {
    verdict: Result<AnalysisResult, String>,
    from_cache: bool,
    content_key: Option<String>,
    elapsed: Duration,
}

#[derive(Default)]
struct QueueState {
    /// Every job, in insertion order
    jobs: Vec<BatchJob>,
    /// Input bytes for jobs that may still need them (pending, processing, failed)
    payloads: HashMap<String, Arc<ImageInput>>,
    in_flight: usize,
    shutdown: bool,
}

impl QueueState {
    /// Promote the oldest pending job. Caller holds the queue lock.
    fn claim_next(&mut self) -> Option<Claim> {
        let job = self
            .jobs
            .iter_mut()
            .find(|job| job.status == JobStatus::Pending)?;
        let input = self.payloads.get(&job.id)?.clone();

        job.status = JobStatus::Processing;
        self.in_flight += 1;

        Some(Claim {
            job_id: job.id.clone(),
            input,
        })
    }

    fn has_pending(&self) -> bool {
        self.jobs.iter().any(|job| job.status == JobStatus::Pending)
    }

    fn is_idle(&self) -> bool {
        self.in_flight == 0 && !self.has_pending()
    }

    fn counts(&self) -> BatchCounts {
        BatchCounts {
            total: self.jobs.len(),
            completed: self
                .jobs
                .iter()
                .filter(|job| job.status == JobStatus::Completed)
                .count(),
            failed: self
                .jobs
                .iter()
                .filter(|job| job.status == JobStatus::Failed)
                .count(),
        }
    }
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signalled when pending work appears or on shutdown
    work_ready: Condvar,
    /// Signalled on every job transition
    state_changed: Condvar,
    provider: Arc<dyn DetectionProvider>,
    cache: Option<Arc<ContentCache>>,
    config: SchedulerConfig,
    events: EventSender,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // Workers never panic while holding the lock; provider calls run outside it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn worker_loop(&self, worker: usize) {
        debug!(worker, "batch worker started");
        loop {
            let claim = {
                let mut state = self.lock_state();
                loop {
                    if state.shutdown {
                        debug!(worker, "batch worker stopping");
                        return;
                    }
                    if let Some(claim) = state.claim_next() {
                        debug_assert!(state.in_flight <= self.config.max_concurrent);
                        break claim;
                    }
                    state = self
                        .work_ready
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
            };

            self.state_changed.notify_all();
            self.events.send(Event::Batch(BatchEvent::Started {
                job_id: claim.job_id.clone(),
            }));

            let outcome = self.process(&claim);
            self.finish(&claim.job_id, outcome);
        }
    }

    /// Run one job. No lock is held here.
    fn process(&self, claim: &Claim) -> Outcome {
        let started = Instant::now();
        let bytes = claim.input.bytes.as_slice();
        let key = self.cache.as_ref().map(|_| ContentKey::from_bytes(bytes));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            match cache.get(key) {
                Ok(Some(entry)) => {
                    return Outcome {
                        verdict: Ok(entry.result),
                        from_cache: true,
                        content_key: Some(key.to_string()),
                        elapsed: started.elapsed(),
                    };
                }
                Ok(None) => {}
                Err(e) => warn!(job = %claim.job_id, error = %e, "cache lookup failed, analyzing anyway"),
            }
        }

        let verdict = match catch_unwind(AssertUnwindSafe(|| self.provider.analyze(bytes))) {
            Ok(Ok(result)) => {
                if let (Some(cache), Some(key), true) = (&self.cache, &key, self.config.populate_cache) {
                    if let Err(e) = cache.put(key, result.clone()) {
                        warn!(job = %claim.job_id, error = %e, "failed to cache verdict");
                    }
                }
                Ok(result)
            }
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(panic_message(panic.as_ref())),
        };

        Outcome {
            verdict,
            from_cache: false,
            content_key: key.map(|k| k.to_string()),
            elapsed: started.elapsed(),
        }
    }

    /// Record a finished job and wake anyone watching.
    fn finish(&self, job_id: &str, outcome: Outcome) {
        let processing_time_ms = outcome.elapsed.as_millis() as u64;
        let mut events = Vec::with_capacity(2);

        {
            let mut state = self.lock_state();
            state.in_flight = state.in_flight.saturating_sub(1);

            let succeeded = outcome.verdict.is_ok();
            if let Some(job) = state.jobs.iter_mut().find(|job| job.id == job_id) {
                job.processing_time_ms = Some(processing_time_ms);
                job.from_cache = outcome.from_cache;
                job.content_key = outcome.content_key;

                match outcome.verdict {
                    Ok(result) => {
                        job.status = JobStatus::Completed;
                        job.result = Some(result);
                        job.error = None;
                        debug!(job = %job.id, name = %job.name, processing_time_ms, from_cache = job.from_cache, "job completed");
                        events.push(BatchEvent::Completed {
                            job_id: job.id.clone(),
                            from_cache: job.from_cache,
                            processing_time_ms,
                        });
                    }
                    Err(error) => {
                        job.status = JobStatus::Failed;
                        job.result = None;
                        warn!(job = %job.id, name = %job.name, %error, "job failed");
                        events.push(BatchEvent::Failed {
                            job_id: job.id.clone(),
                            error: error.clone(),
                        });
                        job.error = Some(error);
                    }
                }
            }

            if succeeded {
                state.payloads.remove(job_id);
            }

            if state.is_idle() {
                let counts = state.counts();
                info!(total = counts.total, completed = counts.completed, failed = counts.failed, "batch idle");
                events.push(BatchEvent::Idle(counts));
            }
        }

        self.state_changed.notify_all();
        for event in events {
            self.events.send(Event::Batch(event));
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Analysis panicked: {}", detail)
}

/// Runs analysis jobs on a fixed pool of worker threads.
///
/// Exactly `max_concurrent` workers exist. Each picks the oldest pending job
/// under the queue lock, so at most `max_concurrent` jobs are ever
/// processing, and a worker that finishes a job immediately takes the next.
///
/// Dropping the scheduler stops the workers after their current job;
/// jobs still pending are abandoned.
pub struct BatchScheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl BatchScheduler {
    /// Create a new scheduler builder
    pub fn builder() -> BatchSchedulerBuilder {
        BatchSchedulerBuilder::new()
    }

    fn start(
        config: SchedulerConfig,
        provider: Arc<dyn DetectionProvider>,
        cache: Option<Arc<ContentCache>>,
        events: EventSender,
    ) -> Result<Self, BatchError> {
        if config.max_concurrent == 0 {
            return Err(BatchError::InvalidConcurrency(0));
        }

        let worker_count = config.max_concurrent;
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            work_ready: Condvar::new(),
            state_changed: Condvar::new(),
            provider,
            cache,
            config,
            events,
        });

        let mut scheduler = Self {
            shared,
            workers: Vec::with_capacity(worker_count),
        };

        for worker in 0..worker_count {
            let shared = Arc::clone(&scheduler.shared);
            let handle = std::thread::Builder::new()
                .name(format!("batch-worker-{}", worker))
                .spawn(move || shared.worker_loop(worker))
                .map_err(|e| BatchError::SpawnFailed(e.to_string()))?;
            scheduler.workers.push(handle);
        }

        info!(
            workers = worker_count,
            provider = scheduler.shared.provider.name(),
            cached = scheduler.shared.cache.is_some(),
            "batch scheduler started"
        );
        Ok(scheduler)
    }

    /// The worker budget
    pub fn max_concurrent(&self) -> usize {
        self.shared.config.max_concurrent
    }

    /// Queue inputs in order and return the resulting status.
    pub fn enqueue<I>(&self, inputs: I) -> BatchStatus
    where
        I: IntoIterator<Item = ImageInput>,
    {
        let (status, queued) = {
            let mut state = self.shared.lock_state();
            let mut queued = 0;
            for input in inputs {
                let id = Uuid::new_v4().to_string();
                state
                    .jobs
                    .push(BatchJob::pending(id.clone(), input.name.clone()));
                // Sent under the lock so no worker can report `Started` first.
                self.shared.events.send(Event::Batch(BatchEvent::Queued {
                    job_id: id.clone(),
                    name: input.name.clone(),
                }));
                state.payloads.insert(id, Arc::new(input));
                queued += 1;
            }
            (BatchStatus::from_jobs(&state.jobs), queued)
        };

        if queued > 0 {
            debug!(count = queued, "queued jobs");
            self.shared.work_ready.notify_all();
            self.shared.state_changed.notify_all();
        }

        status
    }

    /// Snapshot of every job and the counts derived from them
    pub fn status(&self) -> BatchStatus {
        BatchStatus::from_jobs(&self.shared.lock_state().jobs)
    }

    /// A single job by id
    pub fn job(&self, id: &str) -> Option<BatchJob> {
        self.shared
            .lock_state()
            .jobs
            .iter()
            .find(|job| job.id == id)
            .cloned()
    }

    /// Remove completed and failed jobs, keeping the rest in order.
    ///
    /// Returns how many jobs were removed.
    pub fn clear_completed(&self) -> usize {
        let mut state = self.shared.lock_state();
        let before = state.jobs.len();

        let QueueState { jobs, payloads, .. } = &mut *state;
        jobs.retain(|job| {
            let keep = !job.status.is_terminal();
            if !keep {
                payloads.remove(&job.id);
            }
            keep
        });

        before - state.jobs.len()
    }

    /// Fail every pending job with [`CANCELLED_MESSAGE`].
    ///
    /// Jobs already processing run to completion. Returns how many jobs
    /// were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = Vec::new();
        let idle_counts = {
            let mut state = self.shared.lock_state();
            for job in state
                .jobs
                .iter_mut()
                .filter(|job| job.status == JobStatus::Pending)
            {
                job.status = JobStatus::Failed;
                job.error = Some(CANCELLED_MESSAGE.to_string());
                cancelled.push(job.id.clone());
            }
            (!cancelled.is_empty() && state.is_idle()).then(|| state.counts())
        };

        if !cancelled.is_empty() {
            info!(count = cancelled.len(), "cancelled pending jobs");
            self.shared.state_changed.notify_all();
        }
        for job_id in &cancelled {
            self.shared
                .events
                .send(Event::Batch(BatchEvent::Cancelled {
                    job_id: job_id.clone(),
                }));
        }
        if let Some(counts) = idle_counts {
            self.shared.events.send(Event::Batch(BatchEvent::Idle(counts)));
        }

        cancelled.len()
    }

    /// Put failed jobs back in the queue, keeping their original positions.
    ///
    /// Returns how many jobs were re-queued.
    pub fn retry_failed(&self) -> usize {
        let retried = {
            let mut state = self.shared.lock_state();
            let QueueState { jobs, payloads, .. } = &mut *state;
            let mut retried = 0;
            for job in jobs
                .iter_mut()
                .filter(|job| job.status == JobStatus::Failed && payloads.contains_key(&job.id))
            {
                job.status = JobStatus::Pending;
                job.error = None;
                job.result = None;
                job.processing_time_ms = None;
                job.from_cache = false;
                job.content_key = None;
                retried += 1;
            }
            retried
        };

        if retried > 0 {
            debug!(count = retried, "re-queued failed jobs");
            self.shared.work_ready.notify_all();
            self.shared.state_changed.notify_all();
        }
        retried
    }

    /// Block until nothing is pending or processing, or `timeout` passes.
    ///
    /// Returns `true` if the queue went idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        self.wait_for(timeout, |status| status.is_idle())
    }

    /// Block until `condition` holds for the current status, or `timeout` passes.
    pub fn wait_for<F>(&self, timeout: Duration, mut condition: F) -> bool
    where
        F: FnMut(&BatchStatus) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock_state();
        loop {
            if condition(&BatchStatus::from_jobs(&state.jobs)) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = match self.shared.state_changed.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

impl Drop for BatchScheduler {
    fn drop(&mut self) {
        self.shared.lock_state().shutdown = true;
        self.shared.work_ready.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::FnProvider;
    use crate::error::ProviderError;

    fn instant_provider() -> Arc<dyn DetectionProvider> {
        Arc::new(FnProvider::new("instant", |bytes: &[u8]| {
            Ok(AnalysisResult::new(0.9, bytes.first() == Some(&1), "instant-model"))
        }))
    }

    fn inputs(count: usize) -> Vec<ImageInput> {
        (0..count)
            .map(|i| ImageInput::new(format!("img-{}.png", i), vec![i as u8; 8]))
            .collect()
    }

    #[test]
    fn builder_requires_provider() {
        assert!(matches!(
            BatchScheduler::builder().build(),
            Err(BatchError::MissingProvider)
        ));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = BatchScheduler::builder()
            .provider(instant_provider())
            .max_concurrent(0)
            .build();
        assert!(matches!(result, Err(BatchError::InvalidConcurrency(0))));
    }

    #[test]
    fn default_budget_is_three() {
        let scheduler = BatchScheduler::builder()
            .provider(instant_provider())
            .build()
            .unwrap();
        assert_eq!(scheduler.max_concurrent(), 3);
    }

    #[test]
    fn enqueue_returns_consistent_snapshot() {
        let scheduler = BatchScheduler::builder()
            .provider(instant_provider())
            .build()
            .unwrap();

        let status = scheduler.enqueue(inputs(5));

        assert_eq!(status.total, 5);
        assert_eq!(
            status.total,
            status.completed + status.failed + status.in_progress + status.pending
        );
        assert_eq!(status.jobs[0].name, "img-0.png");
    }

    #[test]
    fn all_jobs_complete() {
        let scheduler = BatchScheduler::builder()
            .provider(instant_provider())
            .build()
            .unwrap();

        scheduler.enqueue(inputs(10));
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));

        let status = scheduler.status();
        assert_eq!(status.completed, 10);
        assert!(status.jobs.iter().all(|job| job.processing_time_ms.is_some()));
        assert!(status.jobs[1].result.as_ref().unwrap().is_positive);
    }

    #[test]
    fn provider_error_fails_only_that_job() {
        let provider = Arc::new(FnProvider::new("picky", |bytes: &[u8]| {
            if bytes[0] == 2 {
                Err(ProviderError::Fatal("unsupported content".into()))
            } else {
                Ok(AnalysisResult::new(0.5, false, "picky"))
            }
        }));
        let scheduler = BatchScheduler::builder().provider(provider).build().unwrap();

        scheduler.enqueue(inputs(4));
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));

        let status = scheduler.status();
        assert_eq!(status.completed, 3);
        assert_eq!(status.failed, 1);
        assert_eq!(status.jobs[2].error.as_deref(), Some("unsupported content"));
    }

    #[test]
    fn provider_panic_is_contained() {
        let provider = Arc::new(FnProvider::new("explosive", |bytes: &[u8]| {
            if bytes[0] == 0 {
                panic!("detector crashed");
            }
            Ok(AnalysisResult::new(0.5, false, "explosive"))
        }));
        let scheduler = BatchScheduler::builder()
            .provider(provider)
            .max_concurrent(1)
            .build()
            .unwrap();

        scheduler.enqueue(inputs(3));
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));

        let status = scheduler.status();
        assert_eq!(status.failed, 1);
        assert_eq!(status.completed, 2);
        assert!(status.jobs[0]
            .error
            .as_deref()
            .unwrap()
            .contains("detector crashed"));
    }

    #[test]
    fn cache_hits_skip_the_provider() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let provider = Arc::new(FnProvider::new("counting", move |_: &[u8]| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(AnalysisResult::new(0.7, true, "counting"))
        }));
        let cache = Arc::new(ContentCache::in_memory());
        let scheduler = BatchScheduler::builder()
            .provider(provider)
            .cache(Arc::clone(&cache))
            .max_concurrent(1)
            .build()
            .unwrap();

        scheduler.enqueue(vec![ImageInput::new("a.png", vec![7; 16])]);
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));
        scheduler.enqueue(vec![ImageInput::new("renamed-copy.png", vec![7; 16])]);
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));

        let status = scheduler.status();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(!status.jobs[0].from_cache);
        assert!(status.jobs[1].from_cache);
        assert_eq!(status.jobs[0].content_key, status.jobs[1].content_key);
    }

    #[test]
    fn populate_cache_can_be_disabled() {
        let cache = Arc::new(ContentCache::in_memory());
        let scheduler = BatchScheduler::builder()
            .provider(instant_provider())
            .cache(Arc::clone(&cache))
            .populate_cache(false)
            .build()
            .unwrap();

        scheduler.enqueue(inputs(2));
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));

        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn retry_failed_requeues_jobs() {
        let attempts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = Arc::new(FnProvider::new("flaky", move |_: &[u8]| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Err(ProviderError::Retryable("timeout".into()))
            } else {
                Ok(AnalysisResult::new(0.6, false, "flaky"))
            }
        }));
        let scheduler = BatchScheduler::builder()
            .provider(provider)
            .max_concurrent(1)
            .build()
            .unwrap();

        scheduler.enqueue(inputs(1));
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));
        assert_eq!(scheduler.status().failed, 1);

        assert_eq!(scheduler.retry_failed(), 1);
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));

        let status = scheduler.status();
        assert_eq!(status.completed, 1);
        assert!(status.jobs[0].error.is_none());
    }

    #[test]
    fn retried_job_forgets_previous_attempt() {
        let (release, gate) = crossbeam_channel::unbounded::<()>();
        let attempts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = Arc::new(FnProvider::new("gated", move |_: &[u8]| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                return Err(ProviderError::Fatal("bad upload".into()));
            }
            gate.recv_timeout(Duration::from_secs(5))
                .map_err(|_| ProviderError::Retryable("gate timed out".into()))?;
            Ok(AnalysisResult::new(0.4, false, "gated"))
        }));
        let scheduler = BatchScheduler::builder()
            .provider(provider)
            .cache(Arc::new(ContentCache::in_memory()))
            .max_concurrent(1)
            .build()
            .unwrap();

        let status = scheduler.enqueue(inputs(2));
        let failed_id = status.jobs[0].id.clone();
        assert!(scheduler.wait_for(Duration::from_secs(5), |s| s.failed == 1 && s.in_progress == 1));
        assert!(scheduler.job(&failed_id).unwrap().content_key.is_some());

        assert_eq!(scheduler.retry_failed(), 1);

        let requeued = scheduler.job(&failed_id).unwrap();
        assert_eq!(requeued.status, JobStatus::Pending);
        assert!(requeued.content_key.is_none());
        assert!(requeued.error.is_none());
        assert!(requeued.processing_time_ms.is_none());

        release.send(()).unwrap();
        release.send(()).unwrap();
        assert!(scheduler.wait_until_idle(Duration::from_secs(5)));
        assert_eq!(scheduler.status().completed, 2);
    }

    #[test]
    fn job_lookup_by_id() {
        let scheduler = BatchScheduler::builder()
            .provider(instant_provider())
            .build()
            .unwrap();

        let status = scheduler.enqueue(inputs(1));
        let id = status.jobs[0].id.clone();

        assert_eq!(scheduler.job(&id).unwrap().name, "img-0.png");
        assert!(scheduler.job("missing").is_none());
    }

    #[test]
    fn independent_schedulers_coexist() {
        let first = BatchScheduler::builder()
            .provider(instant_provider())
            .build()
            .unwrap();
        let second = BatchScheduler::builder()
            .provider(instant_provider())
            .build()
            .unwrap();

        first.enqueue(inputs(2));
        assert!(first.wait_until_idle(Duration::from_secs(5)));

        assert_eq!(first.status().total, 2);
        assert_eq!(second.status().total, 0);
    }
}
