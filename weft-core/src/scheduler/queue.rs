//! Job Queue
//!
//! Render effects do not re-run when their data changes; they queue a job.
//! The queue is duplicate-free, so any number of writes before the next tick
//! cost one run per job, and it schedules exactly one flush per burst.
//!
//! # Algorithm
//!
//! 1. `queue_job` appends the job unless a job with the same id is already
//!    waiting.
//! 2. If no flush is pending and none is in progress, one is deferred to the
//!    next tick.
//! 3. The flush pops jobs from the front until the queue is empty. Jobs
//!    queued by running jobs land at the back and are picked up by the same
//!    flush.
//! 4. A job that runs more than the configured recursion limit within one
//!    flush is dropped with an error instead of spinning forever.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::tick::next_tick;
use crate::config;

/// Stable identity of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl JobId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of deferred work. Clones share the id, so they de-duplicate.
#[derive(Clone)]
pub struct Job {
    id: JobId,
    run: Rc<dyn Fn()>,
}

impl Job {
    pub fn new(run: impl Fn() + 'static) -> Self {
        Self {
            id: JobId::new(),
            run: Rc::new(run),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn run(&self) {
        (self.run)();
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("id", &self.id).finish()
    }
}

#[derive(Default)]
struct JobQueue {
    jobs: VecDeque<Job>,
    queued: HashSet<JobId>,
    flush_pending: bool,
    flushing: bool,
    /// Bumped by every flush; a deferred flush from an older epoch is stale.
    epoch: u64,
}

impl JobQueue {
    fn push(&mut self, job: Job) -> bool {
        if !self.queued.insert(job.id) {
            return false;
        }
        self.jobs.push_back(job);
        true
    }

    fn pop(&mut self) -> Option<Job> {
        let job = self.jobs.pop_front()?;
        self.queued.remove(&job.id);
        Some(job)
    }
}

thread_local! {
    static JOB_QUEUE: RefCell<JobQueue> = RefCell::new(JobQueue::default());
}

/// Queue `job` for the next flush.
pub fn queue_job(job: Job) {
    let scheduled_epoch = JOB_QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        let id = job.id;
        if queue.push(job) {
            tracing::trace!(job = id.raw(), "job queued");
        }
        if queue.flush_pending || queue.flushing {
            None
        } else {
            queue.flush_pending = true;
            Some(queue.epoch)
        }
    });

    if let Some(epoch) = scheduled_epoch {
        next_tick(move || flush_scheduled(epoch));
    }
}

/// The deferred flush. A direct [`flush_jobs`] call in the meantime already
/// did its work, so it becomes a no-op.
fn flush_scheduled(epoch: u64) {
    let stale = JOB_QUEUE.with(|queue| queue.borrow().epoch != epoch);
    if stale {
        tracing::trace!(epoch, "deferred flush already ran");
        return;
    }
    flush_jobs();
}

/// Resets the flushing flag even if a job panics.
struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        let _ = JOB_QUEUE.try_with(|queue| queue.borrow_mut().flushing = false);
    }
}

/// Run queued jobs in FIFO order until the queue is empty.
pub fn flush_jobs() {
    JOB_QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        queue.flush_pending = false;
        queue.flushing = true;
        queue.epoch += 1;
    });
    let _guard = FlushGuard;

    let limit = config::recursion_limit();
    let mut runs: HashMap<JobId, usize> = HashMap::new();
    let mut total = 0usize;

    loop {
        let next = JOB_QUEUE.with(|queue| queue.borrow_mut().pop());
        let Some(job) = next else { break };

        let count = runs.entry(job.id).or_insert(0);
        *count += 1;
        if *count > limit {
            tracing::error!(
                job = job.id.raw(),
                limit,
                "maximum recursive updates exceeded; a job keeps re-queueing itself"
            );
            continue;
        }

        job.run();
        total += 1;
    }

    tracing::debug!(jobs = total, "job queue flushed");
}

/// Drop a waiting job. Used when the work it would do is being done right
/// now, e.g. a parent re-rendering a child synchronously.
pub fn invalidate_job(id: JobId) -> bool {
    JOB_QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        if !queue.queued.remove(&id) {
            return false;
        }
        queue.jobs.retain(|job| job.id != id);
        true
    })
}

/// Whether a job with this id is waiting.
pub fn is_queued(id: JobId) -> bool {
    JOB_QUEUE.with(|queue| queue.borrow().queued.contains(&id))
}

/// Number of waiting jobs.
pub fn queued_jobs() -> usize {
    JOB_QUEUE.with(|queue| queue.borrow().jobs.len())
}

/// Whether a flush has been deferred and has not started yet.
pub fn is_flush_pending() -> bool {
    JOB_QUEUE.with(|queue| queue.borrow().flush_pending)
}
