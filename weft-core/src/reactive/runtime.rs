//! Reactive Runtime
//!
//! The runtime owns the dependency graph of reactive objects: for every
//! observed target, a map from property key to the [`Dep`] of effects that
//! read it.
//!
//! # How It Works
//!
//! 1. When a mutable wrapper reads a property inside a running effect, the
//!    runtime records the edge (target, key) → effect.
//!
//! 2. When a mutable wrapper writes a property, the runtime looks up the dep
//!    for exactly that (target, key) and notifies its effects synchronously.
//!
//! 3. When a target object is dropped its entry is removed.
//!
//! # Thread Safety
//!
//! The graph is thread-local. Each thread has an independent reactive world
//! and reactive values are `!Send`, so no locking is needed.

use std::cell::RefCell;
use std::collections::HashMap;

use super::context;
use super::dep::{track_effects, trigger_effects, Dep};
use super::value::{PropKey, TargetId};

type KeyToDep = HashMap<PropKey, Dep>;

thread_local! {
    static TARGET_MAP: RefCell<HashMap<TargetId, KeyToDep>> = RefCell::new(HashMap::new());
}

/// Entry points into the thread-local dependency graph.
pub struct Runtime;

impl Runtime {
    /// Record that the running effect read `key` of `target`.
    ///
    /// No-op unless [`Runtime::is_tracking`] is true.
    pub fn track(target: TargetId, key: &str) {
        if !Self::is_tracking() {
            return;
        }

        let dep = TARGET_MAP.with(|map| {
            let mut map = map.borrow_mut();
            let deps = map.entry(target).or_default();
            match deps.get(key) {
                Some(dep) => dep.clone(),
                None => {
                    let dep = Dep::new();
                    deps.insert(PropKey::from(key), dep.clone());
                    dep
                }
            }
        });

        tracing::trace!(target_id = target.raw(), key, "track");
        track_effects(&dep);
    }

    /// Notify the effects that read `key` of `target`.
    pub fn trigger(target: TargetId, key: &str) {
        let dep = TARGET_MAP.with(|map| {
            map.borrow()
                .get(&target)
                .and_then(|deps| deps.get(key))
                .cloned()
        });

        if let Some(dep) = dep {
            tracing::trace!(target_id = target.raw(), key, subscribers = dep.len(), "trigger");
            trigger_effects(&dep);
        }
    }

    /// True when an effect is running and still active.
    pub fn is_tracking() -> bool {
        context::tracking_effect().is_some()
    }

    /// Number of effects subscribed to `key` of `target`.
    pub fn subscriber_count(target: TargetId, key: &str) -> usize {
        TARGET_MAP.with(|map| {
            map.borrow()
                .get(&target)
                .and_then(|deps| deps.get(key))
                .map(Dep::len)
                .unwrap_or(0)
        })
    }

    /// Drop the graph entry of a target that no longer exists.
    pub(crate) fn forget_target(target: TargetId) {
        // Dropping the removed deps can drop effects whose bodies own other
        // objects, which re-enter here; the map borrow must be released first.
        let removed = TARGET_MAP
            .try_with(|map| {
                map.try_borrow_mut()
                    .ok()
                    .and_then(|mut map| map.remove(&target))
            })
            .ok()
            .flatten();
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::effect;
    use crate::reactive::value::Object;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn track_outside_effect_records_nothing() {
        let object = Object::new();
        Runtime::track(object.id(), "foo");
        assert_eq!(Runtime::subscriber_count(object.id(), "foo"), 0);
        assert!(!Runtime::is_tracking());
    }

    #[test]
    fn trigger_notifies_only_the_exact_key() {
        let object = Object::new();
        let id = object.id();
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _runner = effect(move || {
            Runtime::track(id, "foo");
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(Runtime::subscriber_count(id, "foo"), 1);

        Runtime::trigger(id, "bar");
        assert_eq!(runs.get(), 1);

        Runtime::trigger(id, "foo");
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn dropping_the_target_forgets_its_deps() {
        let object = Object::new();
        let id = object.id();
        let runner = effect(move || Runtime::track(id, "foo"));
        assert_eq!(Runtime::subscriber_count(id, "foo"), 1);

        drop(object);
        assert_eq!(Runtime::subscriber_count(id, "foo"), 0);
        runner.stop();
    }

    #[test]
    fn is_tracking_inside_effect() {
        let seen = Rc::new(Cell::new(false));
        let seen_clone = seen.clone();
        let _runner = effect(move || seen_clone.set(Runtime::is_tracking()));
        assert!(seen.get());
    }
}
