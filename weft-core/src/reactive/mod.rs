//! Reactive Primitives
//!
//! This module implements the dependency-tracking half of the engine:
//! observable objects, reference cells and effects.
//!
//! # Concepts
//!
//! ## Reactive objects
//!
//! A [`Reactive`] wraps a plain [`Object`]. Reading a property inside a
//! running effect subscribes that effect to exactly that (object, key) pair;
//! writing the property notifies the subscribed effects. Read-only wrappers
//! never subscribe anything and refuse writes.
//!
//! ## Refs
//!
//! A [`Ref`] is a reactive box for one value with its own dependency set.
//!
//! ## Effects
//!
//! An effect is a computation that re-runs when something it read changes.
//! Effects created with a scheduler hand the re-run to the scheduler instead,
//! which is how the renderer batches component updates.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local context stack to know which effect
//! is reading. All graph state is thread-local as well; values built on one
//! thread are `!Send` and stay there.

mod context;
mod dep;
mod effect;
mod proxy;
mod reference;
mod runtime;
mod value;

pub use context::{active_effect_id, untrack};
pub use dep::{track_effects, trigger_effects, Dep};
pub use effect::{effect, effect_with, stop, EffectId, EffectOptions, EffectRunner, ReactiveEffect};
pub use proxy::{
    is_proxy, is_reactive, is_readonly, reactive, readonly, shallow_readonly, to_raw, wrap, Flavor,
    Reactive,
};
pub use reference::{is_ref, proxy_refs, un_ref, Ref, RefsProxy};
pub use runtime::Runtime;
pub use value::{Object, PropKey, TargetId, Value};
