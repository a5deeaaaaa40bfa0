//! Weft Core
//!
//! This crate provides the runtime for the Weft reactive UI engine.
//! It implements:
//!
//! - Reactive objects, refs and effects with automatic dependency tracking
//! - A job scheduler that batches re-renders into one flush per tick
//! - A keyed tree reconciler that drives any host through a small adapter
//! - A template compiler for `<tag>` / text / `{{ expr }}` templates
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: dependency tracking, wrappers, effects and refs
//! - `scheduler`: the tick loop and the job queue
//! - `renderer`: tree descriptions, patching, components, host adapters
//! - `compiler`: template parsing, transforms and instantiation
//! - `config`: per-thread runtime configuration
//! - `error`: error types
//!
//! All state is thread-local: each thread has its own reactive world.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_core::reactive::{reactive, Object};
//! use weft_core::renderer::{ComponentDef, MemoryHost, Renderer, VNode};
//! use weft_core::scheduler::run_until_idle;
//!
//! let state = reactive(&Object::from([("count", 0)]));
//!
//! let counter = ComponentDef::new("Counter", {
//!     let state = state.clone();
//!     move |_props| VNode::element("span").with_text(state.get("count").to_display_string())
//! });
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("app");
//! let renderer = Renderer::new(host);
//! let mut root = renderer.create_root(container);
//! root.render(VNode::component(counter, Default::default()));
//!
//! state.set("count", 1);
//! state.set("count", 2);
//! run_until_idle(); // one re-render: <span>2</span>
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod reactive;
pub mod renderer;
pub mod scheduler;

pub use config::RuntimeConfig;
pub use error::{ConfigError, ParseError};
