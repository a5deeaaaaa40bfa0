//! Reactive Context
//!
//! The reactive context tracks which effect is currently running. This is
//! what makes dependency tracking automatic: when a reactive property is
//! read, the runtime asks the context which effect (if any) is reading it.
//!
//! # Implementation
//!
//! We use a thread-local stack. Running an effect pushes it and the returned
//! guard pops it, so nested effects restore the outer effect when they
//! finish, even if the inner body panics. [`untrack`] pushes an empty entry
//! so reads inside it register nothing.

use std::cell::RefCell;
use std::rc::Rc;

use super::effect::{EffectId, ReactiveEffect};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Option<Rc<ReactiveEffect>>>> = RefCell::new(Vec::new());
}

/// Guard that pops the context when dropped.
pub(crate) struct ActiveEffectGuard {
    effect_id: Option<EffectId>,
}

impl ActiveEffectGuard {
    /// Make `effect` the active effect until the guard is dropped.
    pub(crate) fn enter(effect: Rc<ReactiveEffect>) -> Self {
        let effect_id = Some(effect.id());
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(Some(effect)));
        Self { effect_id }
    }

    fn enter_untracked() -> Self {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(None));
        Self { effect_id: None }
    }
}

impl Drop for ActiveEffectGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.as_ref().map(|effect| effect.id()),
                    self.effect_id,
                    "reactive context mismatch"
                );
            }
        });
    }
}

/// The effect currently running on this thread, if any.
pub(crate) fn active_effect() -> Option<Rc<ReactiveEffect>> {
    CONTEXT_STACK.with(|stack| stack.borrow().last().cloned().flatten())
}

/// The running effect, but only if it is still allowed to collect
/// dependencies.
pub(crate) fn tracking_effect() -> Option<Rc<ReactiveEffect>> {
    active_effect().filter(|effect| effect.is_active())
}

/// Id of the innermost running effect. Unlike [`active_effect_id`] this
/// looks through [`untrack`] entries; outer effects on the stack are not
/// considered.
pub(crate) fn innermost_effect_id() -> Option<EffectId> {
    CONTEXT_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .flatten()
            .next()
            .map(|effect| effect.id())
    })
}

/// Id of the effect currently running, if any.
pub fn active_effect_id() -> Option<EffectId> {
    active_effect().map(|effect| effect.id())
}

/// Run `f` with dependency tracking paused.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _guard = ActiveEffectGuard::enter_untracked();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::EffectOptions;

    fn lazy_effect() -> Rc<ReactiveEffect> {
        ReactiveEffect::new(|| {}, EffectOptions::default())
    }

    #[test]
    fn context_tracks_effect() {
        let effect = lazy_effect();
        assert!(active_effect_id().is_none());

        {
            let _ctx = ActiveEffectGuard::enter(effect.clone());
            assert_eq!(active_effect_id(), Some(effect.id()));
            assert_eq!(innermost_effect_id(), Some(effect.id()));
        }

        assert!(active_effect_id().is_none());
        assert!(innermost_effect_id().is_none());
    }

    #[test]
    fn nested_contexts() {
        let outer = lazy_effect();
        let inner = lazy_effect();

        {
            let _ctx1 = ActiveEffectGuard::enter(outer.clone());
            {
                let _ctx2 = ActiveEffectGuard::enter(inner.clone());
                assert_eq!(active_effect_id(), Some(inner.id()));
                assert_eq!(innermost_effect_id(), Some(inner.id()));
            }
            assert_eq!(active_effect_id(), Some(outer.id()));
        }

        assert!(active_effect_id().is_none());
    }

    #[test]
    fn untrack_hides_the_running_effect() {
        let effect = lazy_effect();
        let _ctx = ActiveEffectGuard::enter(effect.clone());

        untrack(|| {
            assert!(active_effect_id().is_none());
            assert!(tracking_effect().is_none());
            assert_eq!(innermost_effect_id(), Some(effect.id()));
        });
        assert_eq!(active_effect_id(), Some(effect.id()));
    }

    #[test]
    fn stopped_effect_is_not_tracking() {
        let effect = lazy_effect();
        effect.stop();
        let _ctx = ActiveEffectGuard::enter(effect.clone());
        assert!(active_effect().is_some());
        assert!(tracking_effect().is_none());
    }
}
