//! Job Scheduler
//!
//! Coalesces reactive triggers into one pass per tick.
//!
//! # Overview
//!
//! - [`tick`] is the explicit deferred-callback loop that stands in for a
//!   host microtask queue.
//! - [`queue`] is the duplicate-free job queue flushed once per tick.
//!
//! A component's render effect uses [`queue_job`] as its scheduler, so any
//! number of writes in one synchronous burst cause exactly one re-render:
//!
//! ```rust,ignore
//! state.set("a", 1);
//! state.set("b", 2);      // same component, still one queued job
//! run_until_idle();       // one flush, one render
//! ```

pub mod queue;
pub mod tick;

pub use queue::{
    flush_jobs, invalidate_job, is_flush_pending, is_queued, queue_job, queued_jobs, Job, JobId,
};
pub use tick::{next_tick, pending_callbacks, run_until_idle, tick, NextTick};
