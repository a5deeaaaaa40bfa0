//! Value Model
//!
//! Reactive wrappers observe plain mappings. This module defines those
//! mappings ([`Object`]) and the dynamic [`Value`] type stored in them.
//!
//! # Identity
//!
//! Every object carries a unique [`TargetId`]. The dependency graph is keyed
//! by this id, and the proxy caches use it to hand out the same wrapper for
//! the same target. Cloning an `Object` clones the handle, not the data.
//!
//! # Equality
//!
//! `Value` equality is identity equality in the Object.is sense: numbers
//! compare by value except that `NaN` equals `NaN` and `+0` differs from
//! `-0`, strings compare by content, and objects, wrappers and refs compare
//! by pointer. Reference cells use this rule to decide whether an assignment
//! is a change.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::proxy::Reactive;
use super::reference::Ref;
use super::runtime::Runtime;

/// Property key of an [`Object`].
pub type PropKey = Rc<str>;

/// Unique identifier for an observable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct ObjectInner {
    id: TargetId,
    props: RefCell<IndexMap<PropKey, Value>>,
}

impl Drop for ObjectInner {
    fn drop(&mut self) {
        Runtime::forget_target(self.id);
    }
}

/// A plain, ordered mapping with identity.
///
/// Reads and writes on an `Object` are never tracked. Wrap it with
/// [`reactive`](super::reactive) to observe it.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    /// Create an empty object.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                id: TargetId::next(),
                props: RefCell::new(IndexMap::new()),
            }),
        }
    }

    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    /// Read a property. Missing keys read as [`Value::Null`].
    pub fn get(&self, key: &str) -> Value {
        self.inner
            .props
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write a property, returning the previous value if there was one.
    pub fn insert(&self, key: impl Into<PropKey>, value: impl Into<Value>) -> Option<Value> {
        self.inner
            .props
            .borrow_mut()
            .insert(key.into(), value.into())
    }

    /// Delete a property, keeping the order of the remaining ones.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.props.borrow_mut().shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.props.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.props.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.props.borrow().is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<PropKey> {
        self.inner.props.borrow().keys().cloned().collect()
    }

    /// Whether two handles point at the same object.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Convert to JSON. Cycles are cut and rendered as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut seen = HashSet::new();
        object_to_json(self, &mut seen)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<PropKey>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Object::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Object
where
    K: Into<PropKey>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.inner.id)
            .field("keys", &self.keys())
            .finish()
    }
}

/// A dynamically typed value held by objects and reference cells.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    /// A raw, unobserved object.
    Object(Object),
    /// A reactive wrapper around an object.
    Reactive(Reactive),
    /// A reference cell.
    Ref(Ref),
}

impl Value {
    /// Identity comparison with Object.is semantics.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Object::ptr_eq(a, b),
            (Value::Reactive(a), Value::Reactive(b)) => Reactive::ptr_eq(a, b),
            (Value::Ref(a), Value::Ref(b)) => Ref::ptr_eq(a, b),
            _ => false,
        }
    }

    /// True for raw objects and reactive wrappers.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Reactive(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_reactive(&self) -> Option<&Reactive> {
        match self {
            Value::Reactive(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_ref_cell(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Convert to JSON without tracking. Refs are unwrapped, wrappers are
    /// rendered through their raw target.
    pub fn to_json(&self) -> serde_json::Value {
        let mut seen = HashSet::new();
        value_to_json(self, &mut seen)
    }

    /// The text shown for this value inside a template interpolation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.to_string(),
            Value::Ref(r) => r.get_untracked().to_display_string(),
            Value::Object(_) | Value::Reactive(_) => self.to_json().to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn object_to_json(object: &Object, seen: &mut HashSet<TargetId>) -> serde_json::Value {
    if !seen.insert(object.id()) {
        return serde_json::Value::Null;
    }
    let map = object
        .inner
        .props
        .borrow()
        .iter()
        .map(|(key, value)| (key.to_string(), value_to_json(value, seen)))
        .collect();
    seen.remove(&object.id());
    serde_json::Value::Object(map)
}

fn value_to_json(value: &Value, seen: &mut HashSet<TargetId>) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.to_string()),
        Value::Object(o) => object_to_json(o, seen),
        Value::Reactive(r) => object_to_json(&r.to_raw(), seen),
        Value::Ref(r) => value_to_json(&r.get_untracked(), seen),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(o) => o.fmt(f),
            Value::Reactive(r) => r.fmt(f),
            Value::Ref(r) => r.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Reactive> for Value {
    fn from(r: Reactive) -> Self {
        Value::Reactive(r)
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// JSON objects become fresh [`Object`]s. Arrays have no counterpart in the
/// data model and become objects keyed by index.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), Value::from(item)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            ),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
