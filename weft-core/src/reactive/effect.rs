//! Effect Implementation
//!
//! An effect is a re-runnable computation that collects the reactive reads it
//! performs and re-runs when any of them change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its body immediately (unless lazy) to
//!    establish initial dependencies.
//!
//! 2. Before each run the effect unsubscribes from every dep it was in, then
//!    tracks new ones during execution. A branch that is no longer read can
//!    no longer trigger it.
//!
//! 3. When a dependency changes the effect is triggered. With a scheduler
//!    option the scheduler is called instead of re-running inline; this is
//!    how render effects are deferred into the job queue.
//!
//! # Lifetime
//!
//! Deps hold their effects strongly, so an effect stays subscribed for as
//! long as the data it read is alive, whether or not anyone keeps the
//! [`EffectRunner`]. Call [`stop`] to detach it.
//!
//! A body that captures the data it reads forms a cycle: the dep holds the
//! effect, the effect holds the data, and only dropping the data would clear
//! the dep. Such an effect lives until it is stopped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use super::context::{self, ActiveEffectGuard};
use super::dep::WeakDep;

/// Unique identifier for an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl EffectId {
    /// Generate a new unique effect ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EffectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Options accepted by [`effect_with`].
#[derive(Default)]
pub struct EffectOptions {
    scheduler: Option<Rc<dyn Fn()>>,
    on_stop: Option<Box<dyn FnOnce()>>,
    lazy: bool,
}

impl EffectOptions {
    /// Call `scheduler` on trigger instead of re-running the body.
    pub fn scheduler(mut self, scheduler: impl Fn() + 'static) -> Self {
        self.scheduler = Some(Rc::new(scheduler));
        self
    }

    /// Called once when the effect is stopped.
    pub fn on_stop(mut self, on_stop: impl FnOnce() + 'static) -> Self {
        self.on_stop = Some(Box::new(on_stop));
        self
    }

    /// Skip the initial run.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

/// A tracked computation.
pub struct ReactiveEffect {
    id: EffectId,
    body: Box<dyn Fn()>,
    active: Cell<bool>,
    scheduler: Option<Rc<dyn Fn()>>,
    on_stop: RefCell<Option<Box<dyn FnOnce()>>>,
    /// Deps this effect is currently subscribed to.
    deps: RefCell<SmallVec<[WeakDep; 4]>>,
    run_count: Cell<usize>,
}

impl ReactiveEffect {
    /// Create an effect without running it.
    pub fn new(body: impl Fn() + 'static, options: EffectOptions) -> Rc<Self> {
        Rc::new(Self {
            id: EffectId::new(),
            body: Box::new(body),
            active: Cell::new(true),
            scheduler: options.scheduler,
            on_stop: RefCell::new(options.on_stop),
            deps: RefCell::new(SmallVec::new()),
            run_count: Cell::new(0),
        })
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    /// False once the effect has been stopped.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Run the body with this effect as the active effect.
    ///
    /// A stopped effect still runs its body when invoked directly, but
    /// without tracking anything.
    pub fn run(self: &Rc<Self>) {
        if !self.is_active() {
            (self.body)();
            return;
        }

        self.cleanup();
        let _ctx = ActiveEffectGuard::enter(Rc::clone(self));
        self.run_count.set(self.run_count.get() + 1);
        (self.body)();
    }

    /// React to a change in one of the effect's dependencies.
    pub(crate) fn trigger(self: &Rc<Self>) {
        if !self.is_active() {
            return;
        }
        // An effect that writes what it reads would otherwise loop. Outer
        // effects further down the stack are still notified.
        if context::innermost_effect_id() == Some(self.id) {
            tracing::trace!(effect = self.id.raw(), "skipping trigger of running effect");
            return;
        }
        match &self.scheduler {
            Some(scheduler) => scheduler(),
            None => self.run(),
        }
    }

    /// Unsubscribe from all deps and deactivate. Idempotent.
    pub fn stop(&self) {
        if !self.active.get() {
            return;
        }
        self.cleanup();
        self.active.set(false);
        let on_stop = self.on_stop.borrow_mut().take();
        if let Some(on_stop) = on_stop {
            on_stop();
        }
        tracing::debug!(effect = self.id.raw(), "effect stopped");
    }

    pub(crate) fn record_dep(&self, dep: WeakDep) {
        self.deps.borrow_mut().push(dep);
    }

    fn cleanup(&self) {
        let deps = std::mem::take(&mut *self.deps.borrow_mut());
        for dep in deps {
            if let Some(dep) = dep.upgrade() {
                dep.remove(self.id);
            }
        }
    }

    /// Number of deps the effect is subscribed to.
    pub fn dep_count(&self) -> usize {
        self.deps.borrow().len()
    }

    /// Number of tracked runs so far.
    pub fn run_count(&self) -> usize {
        self.run_count.get()
    }
}

impl fmt::Debug for ReactiveEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveEffect")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("run_count", &self.run_count())
            .field("dep_count", &self.dep_count())
            .field("scheduled", &self.scheduler.is_some())
            .finish()
    }
}

/// Handle returned by [`effect`]. Invoking [`run`](Self::run) re-runs the
/// body with tracking.
#[derive(Clone, Debug)]
pub struct EffectRunner {
    effect: Rc<ReactiveEffect>,
}

impl EffectRunner {
    pub fn run(&self) {
        self.effect.run();
    }

    pub fn stop(&self) {
        self.effect.stop();
    }

    pub fn id(&self) -> EffectId {
        self.effect.id()
    }

    pub fn effect(&self) -> &Rc<ReactiveEffect> {
        &self.effect
    }
}

/// Create an effect and run it once.
///
/// # Example
///
/// ```rust,ignore
/// let state = reactive(&Object::from([("count", 0)]));
///
/// let runner = effect({
///     let state = state.clone();
///     move || println!("count is {:?}", state.get("count"))
/// });
///
/// state.set("count", 5); // prints "count is Number(5)"
///
/// // The body keeps `state` alive, so the effect stays subscribed until
/// // it is stopped.
/// stop(&runner);
/// ```
pub fn effect(body: impl Fn() + 'static) -> EffectRunner {
    effect_with(body, EffectOptions::default())
}

/// Create an effect with options.
pub fn effect_with(body: impl Fn() + 'static, options: EffectOptions) -> EffectRunner {
    let lazy = options.lazy;
    let effect = ReactiveEffect::new(body, options);
    if !lazy {
        effect.run();
    }
    EffectRunner { effect }
}

/// Stop the effect behind `runner`.
pub fn stop(runner: &EffectRunner) {
    runner.stop();
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
