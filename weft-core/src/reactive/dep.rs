//! Dependency Sets
//!
//! A [`Dep`] is the set of effects that read one observable slot: one
//! property of one object, or the value of one reference cell. Effects are
//! kept in registration order, which is also the order they are notified in.
//!
//! Deps own their effects. Effects only hold weak handles back to the deps
//! they are registered in, which they use to unsubscribe before re-running.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::context;
use super::effect::{EffectId, ReactiveEffect};

type EffectSet = RefCell<IndexMap<EffectId, Rc<ReactiveEffect>>>;

/// A set of effects subscribed to one observable slot.
#[derive(Clone, Default)]
pub struct Dep {
    effects: Rc<EffectSet>,
}

impl Dep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscribed effects.
    pub fn len(&self) -> usize {
        self.effects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.borrow().is_empty()
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.effects.borrow().contains_key(&id)
    }

    /// Returns `false` if the effect was already subscribed.
    fn insert(&self, effect: &Rc<ReactiveEffect>) -> bool {
        let mut effects = self.effects.borrow_mut();
        if effects.contains_key(&effect.id()) {
            return false;
        }
        effects.insert(effect.id(), Rc::clone(effect));
        true
    }

    pub(crate) fn remove(&self, id: EffectId) {
        self.effects.borrow_mut().shift_remove(&id);
    }

    pub(crate) fn downgrade(&self) -> WeakDep {
        WeakDep(Rc::downgrade(&self.effects))
    }

    fn snapshot(&self) -> Vec<Rc<ReactiveEffect>> {
        self.effects.borrow().values().cloned().collect()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep").field("len", &self.len()).finish()
    }
}

/// Weak handle to a [`Dep`], held by the effects subscribed to it.
#[derive(Clone)]
pub(crate) struct WeakDep(Weak<EffectSet>);

impl WeakDep {
    pub(crate) fn upgrade(&self) -> Option<Dep> {
        self.0.upgrade().map(|effects| Dep { effects })
    }
}

/// Subscribe the running effect to `dep`.
///
/// No-op unless an active effect is running. The edge is recorded on both
/// sides so the effect can unsubscribe before its next run.
pub fn track_effects(dep: &Dep) {
    if let Some(effect) = context::tracking_effect() {
        if dep.insert(&effect) {
            effect.record_dep(dep.downgrade());
        }
    }
}

/// Notify every effect subscribed to `dep`, in registration order.
///
/// The set is snapshotted first: effects that re-run re-subscribe
/// themselves, and that must not extend the current notification pass.
pub fn trigger_effects(dep: &Dep) {
    for effect in dep.snapshot() {
        effect.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::{effect, EffectOptions};
    use std::cell::Cell;

    #[test]
    fn tracking_outside_an_effect_registers_nothing() {
        let dep = Dep::new();
        track_effects(&dep);
        assert!(dep.is_empty());
    }

    #[test]
    fn effect_subscribes_once() {
        let dep = Dep::new();
        let dep_clone = dep.clone();
        let runner = effect(move || {
            track_effects(&dep_clone);
            track_effects(&dep_clone);
        });

        assert_eq!(dep.len(), 1);
        assert!(dep.contains(runner.id()));
        assert_eq!(runner.effect().dep_count(), 1);
    }

    #[test]
    fn trigger_runs_effects_in_registration_order() {
        let dep = Dep::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut runners = Vec::new();
        for name in ["first", "second", "third"] {
            let dep = dep.clone();
            let order = order.clone();
            runners.push(effect(move || {
                track_effects(&dep);
                order.borrow_mut().push(name);
            }));
        }
        order.borrow_mut().clear();

        trigger_effects(&dep);
        assert_eq!(*order.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn scheduler_replaces_inline_run() {
        let dep = Dep::new();
        let runs = Rc::new(Cell::new(0));
        let scheduled = Rc::new(Cell::new(0));

        let dep_clone = dep.clone();
        let runs_clone = runs.clone();
        let scheduled_clone = scheduled.clone();
        let _runner = crate::reactive::effect::effect_with(
            move || {
                track_effects(&dep_clone);
                runs_clone.set(runs_clone.get() + 1);
            },
            EffectOptions::default()
                .scheduler(move || scheduled_clone.set(scheduled_clone.get() + 1)),
        );

        trigger_effects(&dep);
        assert_eq!(runs.get(), 1);
        assert_eq!(scheduled.get(), 1);
    }

    #[test]
    fn dropped_dep_is_not_upgradable() {
        let dep = Dep::new();
        let weak = dep.downgrade();
        assert!(weak.upgrade().is_some());
        drop(dep);
        assert!(weak.upgrade().is_none());
    }
}
