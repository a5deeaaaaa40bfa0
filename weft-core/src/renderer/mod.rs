//! Tree Reconciler
//!
//! Turns tree descriptions into the minimal set of host operations.
//!
//! # Overview
//!
//! - [`VNode`] describes a tree: elements, text, fragments and components,
//!   each optionally keyed.
//! - [`Renderer`] patches an old description against a new one through a
//!   [`HostAdapter`].
//! - Keyed child lists are reconciled with a prefix/suffix scan followed by
//!   a longest-increasing-subsequence pass, so reordering `n` siblings moves
//!   only the ones that left the longest stable run.
//! - Components render inside a reactive effect whose re-runs go through the
//!   job queue.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut host = MemoryHost::new();
//! let container = host.create_container("app");
//! let renderer = Renderer::new(host);
//! let mut root = renderer.create_root(container);
//!
//! root.render(VNode::element("ul").with_children(vec![
//!     VNode::element("li").with_key("a").with_text("a"),
//!     VNode::element("li").with_key("b").with_text("b"),
//! ]));
//! ```

mod component;
mod host;
mod keyed;
mod memory;
mod patch;
mod sequence;
mod vnode;

pub use component::{should_update_component, ComponentDef, ComponentHandle};
pub use host::HostAdapter;
pub use memory::{HostOp, MemNodeId, MemoryHost};
pub use patch::{Renderer, Root};
pub use sequence::longest_increasing_subsequence;
pub use vnode::{props, same_vnode_type, Children, Key, Listener, PropValue, Props, VNode, VNodeKind};
