//! Reference Cells
//!
//! A [`Ref`] is a reactive box around a single value. It owns one dep
//! instead of going through the target map, so it is cheaper than wrapping
//! a one-key object.
//!
//! Assigning the value a ref already holds is a no-op and notifies nobody.
//! Objects assigned to a ref are stored as mutable reactive wrappers, so
//! `ref.get()` of an object is itself observable.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::dep::{track_effects, trigger_effects, Dep};
use super::proxy::reactive;
use super::runtime::Runtime;
use super::value::{Object, PropKey, Value};

struct RefInner {
    /// The value as it was assigned, used for change detection.
    raw: RefCell<Value>,
    /// The value as it is handed out.
    value: RefCell<Value>,
    dep: Dep,
}

/// A reactive single-value cell.
#[derive(Clone)]
pub struct Ref {
    inner: Rc<RefInner>,
}

impl Ref {
    pub fn new(value: impl Into<Value>) -> Self {
        let raw = value.into();
        let value = convert(raw.clone());
        Self {
            inner: Rc::new(RefInner {
                raw: RefCell::new(raw),
                value: RefCell::new(value),
                dep: Dep::new(),
            }),
        }
    }

    /// Read the value, subscribing the running effect.
    pub fn get(&self) -> Value {
        if Runtime::is_tracking() {
            track_effects(&self.inner.dep);
        }
        self.get_untracked()
    }

    pub fn get_untracked(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Assign a value. Returns whether it was a change.
    pub fn set(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if value.same_value(&self.inner.raw.borrow()) {
            return false;
        }

        *self.inner.value.borrow_mut() = convert(value.clone());
        *self.inner.raw.borrow_mut() = value;
        trigger_effects(&self.inner.dep);
        true
    }

    /// Number of effects subscribed to this ref.
    pub fn subscriber_count(&self) -> usize {
        self.inner.dep.len()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("value", &self.get_untracked())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn convert(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Reactive(reactive(&object)),
        other => other,
    }
}

pub fn is_ref(value: &Value) -> bool {
    matches!(value, Value::Ref(_))
}

/// The value inside a ref, or the value itself.
pub fn un_ref(value: &Value) -> Value {
    match value {
        Value::Ref(r) => r.get(),
        other => other.clone(),
    }
}

/// An object view that unwraps refs on read and writes through them.
#[derive(Clone, Debug)]
pub struct RefsProxy {
    target: Object,
}

/// Wrap `target` so its ref-valued properties read like plain values.
pub fn proxy_refs(target: Object) -> RefsProxy {
    RefsProxy { target }
}

impl RefsProxy {
    pub fn get(&self, key: &str) -> Value {
        un_ref(&self.target.get(key))
    }

    /// Assigning a non-ref over a ref updates the ref in place; anything
    /// else replaces the property.
    pub fn set(&self, key: impl Into<PropKey>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        match self.target.get(&key) {
            Value::Ref(existing) if !is_ref(&value) => {
                existing.set(value);
            }
            _ => {
                self.target.insert(key, value);
            }
        }
        true
    }

    pub fn to_raw(&self) -> Object {
        self.target.clone()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
