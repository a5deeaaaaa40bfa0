//! Tick Loop
//!
//! Deferred callbacks run "after the current synchronous work completes".
//! There is no host event loop to borrow that notion from, so the loop is
//! explicit: [`next_tick`] appends a callback to a thread-local FIFO and
//! [`run_until_idle`] drains it. Whoever owns the thread (an application
//! main loop, a test) calls `run_until_idle` at the points where a browser
//! would service its microtask queue.
//!
//! Callbacks deferred while draining are run by the same drain, after the
//! ones already queued.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

type Callback = Box<dyn FnOnce()>;

thread_local! {
    static TICK_QUEUE: RefCell<VecDeque<Callback>> = RefCell::new(VecDeque::new());
}

#[derive(Default)]
struct TickState {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
    continuations: RefCell<Vec<Callback>>,
}

impl TickState {
    fn fire(&self) {
        self.fired.set(true);
        let waker = self.waker.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
        let continuations = std::mem::take(&mut *self.continuations.borrow_mut());
        for continuation in continuations {
            defer(continuation);
        }
    }
}

/// Handle to a point in the tick queue.
///
/// Fires once every callback queued before it has run. It can be polled as a
/// [`Future`] or chained with [`then`](Self::then).
#[derive(Clone, Default)]
pub struct NextTick {
    state: Rc<TickState>,
}

impl NextTick {
    pub fn is_fired(&self) -> bool {
        self.state.fired.get()
    }

    /// Defer `f` until this tick has fired.
    pub fn then(&self, f: impl FnOnce() + 'static) -> NextTick {
        let next = NextTick::default();
        let marker = next.clone();
        let continuation = move || {
            f();
            marker.state.fire();
        };

        if self.is_fired() {
            defer(Box::new(continuation));
        } else {
            self.state
                .continuations
                .borrow_mut()
                .push(Box::new(continuation));
        }
        next
    }
}

impl Future for NextTick {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_fired() {
            Poll::Ready(())
        } else {
            *self.state.waker.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl std::fmt::Debug for NextTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextTick")
            .field("fired", &self.is_fired())
            .finish()
    }
}

fn defer(callback: Callback) {
    TICK_QUEUE.with(|queue| queue.borrow_mut().push_back(callback));
}

/// Run `f` on the next tick. The returned handle fires after `f` has run.
pub fn next_tick(f: impl FnOnce() + 'static) -> NextTick {
    let tick = NextTick::default();
    let marker = tick.clone();
    defer(Box::new(move || {
        f();
        marker.state.fire();
    }));
    tick
}

/// A handle that fires once everything deferred so far has run.
pub fn tick() -> NextTick {
    next_tick(|| {})
}

/// Drain the tick queue, including callbacks deferred while draining.
///
/// Returns the number of callbacks run.
pub fn run_until_idle() -> usize {
    let mut ran = 0;
    loop {
        // The queue borrow must end before the callback runs; callbacks defer more work.
        let next = TICK_QUEUE.with(|queue| queue.borrow_mut().pop_front());
        match next {
            Some(callback) => {
                callback();
                ran += 1;
            }
            None => break,
        }
    }
    if ran > 0 {
        tracing::trace!(callbacks = ran, "tick queue drained");
    }
    ran
}

/// Number of callbacks waiting for the next drain.
pub fn pending_callbacks() -> usize {
    TICK_QUEUE.with(|queue| queue.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::task::noop_waker;

    #[test]
    fn deferred_callbacks_wait_for_the_drain() {
        let ran = Rc::new(Cell::new(false));
        let ran_clone = ran.clone();
        next_tick(move || ran_clone.set(true));

        assert!(!ran.get());
        assert_eq!(run_until_idle(), 1);
        assert!(ran.get());
        assert_eq!(pending_callbacks(), 0);
    }

    #[test]
    fn callbacks_run_in_fifo_order_including_nested_ones() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        next_tick(move || {
            o.borrow_mut().push(1);
            let o = o.clone();
            next_tick(move || o.borrow_mut().push(3));
        });
        let o = order.clone();
        next_tick(move || o.borrow_mut().push(2));

        run_until_idle();
        assert_eq!(*order.borrow(), [1, 2, 3]);
    }

    #[test]
    fn tick_future_resolves_after_drain() {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut handle = tick();

        assert_eq!(Pin::new(&mut handle).poll(&mut cx), Poll::Pending);
        run_until_idle();
        assert!(handle.is_fired());
        assert_eq!(Pin::new(&mut handle).poll(&mut cx), Poll::Ready(()));
    }

    #[test]
    fn then_runs_after_the_tick_it_chains_on() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let first = next_tick(move || o.borrow_mut().push("first"));
        let o = order.clone();
        let second = first.then(move || o.borrow_mut().push("second"));
        let o = order.clone();
        next_tick(move || o.borrow_mut().push("sibling"));

        run_until_idle();
        assert_eq!(*order.borrow(), ["first", "sibling", "second"]);
        assert!(second.is_fired());

        let o = order.clone();
        first.then(move || o.borrow_mut().push("late"));
        run_until_idle();
        assert_eq!(order.borrow().last(), Some(&"late"));
    }
}
