//! Reactive Wrappers
//!
//! A [`Reactive`] wraps an [`Object`] and routes every property access
//! through tracking logic. Callers read and write through the wrapper
//! instead of through the object itself.
//!
//! # Flavors
//!
//! - **Mutable**: reads are tracked, writes trigger, nested objects are
//!   wrapped as mutable when read.
//! - **Readonly**: nothing is tracked, writes are rejected with a warning,
//!   nested objects are wrapped as read-only when read.
//! - **ShallowReadonly**: like readonly, but nested values are returned as
//!   they are stored.
//!
//! Nested wrapping is lazy: wrapping an object never walks its properties.
//!
//! # Identity
//!
//! Wrapping is cached per (flavor, target), so wrapping the same object twice
//! in the same flavor yields the same wrapper. The cache holds weak entries;
//! a wrapper lives as long as something holds it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::runtime::Runtime;
use super::value::{Object, PropKey, TargetId, Value};
use crate::config;

/// Which interception rules a wrapper applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Mutable,
    Readonly,
    ShallowReadonly,
}

impl Flavor {
    fn is_readonly(self) -> bool {
        !matches!(self, Flavor::Mutable)
    }
}

struct ReactiveInner {
    target: Object,
    flavor: Flavor,
}

impl Drop for ReactiveInner {
    fn drop(&mut self) {
        let key = (self.flavor, self.target.id());
        let _ = PROXY_CACHE.try_with(|cache| {
            if let Ok(mut cache) = cache.try_borrow_mut() {
                let dead = cache
                    .get(&key)
                    .map(|weak| weak.strong_count() == 0)
                    .unwrap_or(false);
                if dead {
                    cache.remove(&key);
                }
            }
        });
    }
}

thread_local! {
    static PROXY_CACHE: RefCell<HashMap<(Flavor, TargetId), Weak<ReactiveInner>>> =
        RefCell::new(HashMap::new());
}

/// An intercepting wrapper around an [`Object`].
#[derive(Clone)]
pub struct Reactive {
    inner: Rc<ReactiveInner>,
}

impl Reactive {
    /// Get or create the wrapper for `target` in `flavor`.
    pub fn wrap(target: &Object, flavor: Flavor) -> Self {
        let key = (flavor, target.id());
        PROXY_CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            if let Some(inner) = cache.get(&key).and_then(Weak::upgrade) {
                return Self { inner };
            }
            let inner = Rc::new(ReactiveInner {
                target: target.clone(),
                flavor,
            });
            cache.insert(key, Rc::downgrade(&inner));
            Self { inner }
        })
    }

    pub fn flavor(&self) -> Flavor {
        self.inner.flavor
    }

    /// True for the mutable flavor.
    pub fn is_reactive(&self) -> bool {
        self.inner.flavor == Flavor::Mutable
    }

    /// True for both read-only flavors.
    pub fn is_readonly(&self) -> bool {
        self.inner.flavor.is_readonly()
    }

    pub fn is_shallow(&self) -> bool {
        self.inner.flavor == Flavor::ShallowReadonly
    }

    /// The wrapped object.
    pub fn to_raw(&self) -> Object {
        self.inner.target.clone()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Read a property.
    ///
    /// The mutable flavor records a dependency on (target, key). Object
    /// values come back wrapped in the same flavor family.
    pub fn get(&self, key: &str) -> Value {
        let target = &self.inner.target;
        if !self.is_readonly() {
            Runtime::track(target.id(), key);
        }

        let value = target.get(key);
        match self.inner.flavor {
            Flavor::ShallowReadonly => value,
            Flavor::Readonly => match value {
                Value::Object(object) => Value::Reactive(readonly(&object)),
                Value::Reactive(nested) if !nested.is_readonly() => {
                    Value::Reactive(readonly(&nested.to_raw()))
                }
                other => other,
            },
            Flavor::Mutable => match value {
                Value::Object(object) => Value::Reactive(reactive(&object)),
                other => other,
            },
        }
    }

    /// Tracked membership test.
    pub fn has(&self, key: &str) -> bool {
        if !self.is_readonly() {
            Runtime::track(self.inner.target.id(), key);
        }
        self.inner.target.contains_key(key)
    }

    /// Write a property.
    ///
    /// Read-only wrappers leave the target untouched, emit a warning and
    /// still report success so callers that write through whatever they were
    /// handed do not break.
    pub fn set(&self, key: impl Into<PropKey>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.is_readonly() {
            warn_readonly("set", &key);
            return true;
        }

        let target = &self.inner.target;
        target.insert(key.clone(), value);
        Runtime::trigger(target.id(), &key);
        true
    }

    /// Delete a property. Triggers only when the key existed.
    pub fn remove(&self, key: &str) -> bool {
        if self.is_readonly() {
            warn_readonly("remove", key);
            return true;
        }

        let target = &self.inner.target;
        if target.remove(key).is_some() {
            Runtime::trigger(target.id(), key);
        }
        true
    }

    /// Keys in insertion order. Not tracked.
    pub fn keys(&self) -> Vec<PropKey> {
        self.inner.target.keys()
    }
}

fn warn_readonly(operation: &str, key: &str) {
    if config::warn_readonly_writes() {
        tracing::warn!(operation, key, "write to read-only reactive object ignored");
    }
}

impl fmt::Debug for Reactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("flavor", &self.inner.flavor)
            .field("target", &self.inner.target)
            .finish()
    }
}

/// Mutable wrapper for `target`.
pub fn reactive(target: &Object) -> Reactive {
    Reactive::wrap(target, Flavor::Mutable)
}

/// Read-only, deep wrapper for `target`.
pub fn readonly(target: &Object) -> Reactive {
    Reactive::wrap(target, Flavor::Readonly)
}

/// Read-only wrapper that does not wrap nested objects.
pub fn shallow_readonly(target: &Object) -> Reactive {
    Reactive::wrap(target, Flavor::ShallowReadonly)
}

/// Wrap any value.
///
/// Objects are wrapped, wrappers of the same flavor come back unchanged,
/// wrappers of another flavor are re-wrapped from their raw target, and
/// everything else is returned as is.
pub fn wrap(value: Value, flavor: Flavor) -> Value {
    match value {
        Value::Object(object) => Value::Reactive(Reactive::wrap(&object, flavor)),
        Value::Reactive(existing) if existing.flavor() == flavor => Value::Reactive(existing),
        Value::Reactive(existing) => Value::Reactive(Reactive::wrap(&existing.to_raw(), flavor)),
        other => other,
    }
}

/// True for mutable wrappers.
pub fn is_reactive(value: &Value) -> bool {
    matches!(value, Value::Reactive(r) if r.is_reactive())
}

/// True for read-only wrappers of either flavor.
pub fn is_readonly(value: &Value) -> bool {
    matches!(value, Value::Reactive(r) if r.is_readonly())
}

/// True for any wrapper.
pub fn is_proxy(value: &Value) -> bool {
    matches!(value, Value::Reactive(_))
}

/// Strip a wrapper, returning the raw object. Other values pass through.
pub fn to_raw(value: &Value) -> Value {
    match value {
        Value::Reactive(r) => Value::Object(r.to_raw()),
        other => other.clone(),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::effect;
    use serde_json::json;
    use std::cell::Cell;

    fn sample() -> Object {
        Value::from(json!({ "foo": 1, "bar": { "baz": 2 } }))
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn wrapping_is_cached_per_flavor() {
        let original = sample();
        let a = reactive(&original);
        let b = reactive(&original);
        assert!(Reactive::ptr_eq(&a, &b));

        let r = readonly(&original);
        assert!(!Reactive::ptr_eq(&a, &r));
        assert!(Reactive::ptr_eq(&r, &readonly(&original)));
    }

    #[test]
    fn meta_queries() {
        let original = sample();
        let observed = reactive(&original);
        assert!(observed.is_reactive());
        assert!(!observed.is_readonly());
        assert!(Object::ptr_eq(&observed.to_raw(), &original));

        let frozen = shallow_readonly(&original);
        assert!(frozen.is_readonly());
        assert!(frozen.is_shallow());
        assert!(!frozen.is_reactive());
    }

    #[test]
    fn wrap_passes_primitives_and_same_flavor_through() {
        assert_eq!(wrap(Value::from(3), Flavor::Mutable), Value::from(3));

        let observed = Value::Reactive(reactive(&sample()));
        let again = wrap(observed.clone(), Flavor::Mutable);
        assert_eq!(again, observed);

        let frozen = wrap(observed.clone(), Flavor::Readonly);
        assert!(is_readonly(&frozen));
        assert!(is_proxy(&frozen));
        assert!(!is_reactive(&frozen));
    }

    #[test]
    fn nested_objects_are_wrapped_lazily_in_the_same_family() {
        let original = sample();

        let nested = reactive(&original).get("bar");
        assert!(is_reactive(&nested));

        let nested = readonly(&original).get("bar");
        assert!(is_readonly(&nested));

        let nested = shallow_readonly(&original).get("bar");
        assert!(matches!(nested, Value::Object(_)));
    }

    #[test]
    fn nested_wrapper_is_cached_too() {
        let observed = reactive(&sample());
        assert_eq!(observed.get("bar"), observed.get("bar"));
    }

    #[test]
    fn readonly_write_is_ignored_but_reports_success() {
        let original = sample();
        let frozen = readonly(&original);

        assert!(frozen.set("foo", 2));
        assert!(frozen.remove("foo"));
        assert_eq!(original.get("foo"), Value::from(1));
        assert_eq!(frozen.get("foo"), Value::from(1));
    }

    #[test]
    fn readonly_reads_are_not_tracked() {
        let original = sample();
        let frozen = readonly(&original);
        let observed = reactive(&original);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let _runner = effect(move || {
            frozen.get("foo");
            runs_clone.set(runs_clone.get() + 1);
        });

        observed.set("foo", 5);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn mutable_write_triggers_readers() {
        let observed = reactive(&sample());
        let seen = Rc::new(Cell::new(0.0));

        let reader = observed.clone();
        let seen_clone = seen.clone();
        let _runner = effect(move || {
            seen_clone.set(reader.get("foo").as_f64().unwrap_or(-1.0));
        });
        assert_eq!(seen.get(), 1.0);

        observed.set("foo", 7);
        assert_eq!(seen.get(), 7.0);
    }

    #[test]
    fn nested_writes_trigger_through_nested_wrapper() {
        let observed = reactive(&sample());
        let seen = Rc::new(Cell::new(0.0));

        let reader = observed.clone();
        let seen_clone = seen.clone();
        let _runner = effect(move || {
            let bar = reader.get("bar");
            let baz = bar.as_reactive().map(|bar| bar.get("baz"));
            seen_clone.set(baz.and_then(|v| v.as_f64()).unwrap_or(-1.0));
        });
        assert_eq!(seen.get(), 2.0);

        let bar = observed.get("bar");
        bar.as_reactive().unwrap().set("baz", 3);
        assert_eq!(seen.get(), 3.0);
    }

    #[test]
    fn remove_triggers_and_has_tracks() {
        let observed = reactive(&sample());
        let present = Rc::new(Cell::new(false));

        let reader = observed.clone();
        let present_clone = present.clone();
        let _runner = effect(move || present_clone.set(reader.has("foo")));
        assert!(present.get());

        observed.remove("foo");
        assert!(!present.get());
    }

    #[test]
    fn cache_entry_is_released_with_the_wrapper() {
        let original = sample();
        let key = (Flavor::Mutable, original.id());
        let observed = reactive(&original);
        assert!(PROXY_CACHE.with(|cache| cache.borrow().contains_key(&key)));

        drop(observed);
        assert!(!PROXY_CACHE.with(|cache| cache.borrow().contains_key(&key)));
    }
}
