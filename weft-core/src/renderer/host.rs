//! Host Adapter
//!
//! The renderer never touches a host tree directly. Everything it does to
//! the host goes through this small table of primitive operations, so the
//! same reconciler can drive a browser DOM binding, a terminal widget tree
//! or the in-memory [`MemoryHost`](super::MemoryHost) used in tests.

use std::fmt::Debug;

use super::vnode::PropValue;

/// Primitive operations on a host tree.
pub trait HostAdapter {
    /// Handle to a host node. Cloning must yield a handle to the same node.
    type Node: Clone + PartialEq + Debug + 'static;

    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Detach `node` from its parent, if it has one.
    fn remove(&mut self, node: &Self::Node);

    /// Insert `child` into `parent` before `anchor`, or at the end when there
    /// is no anchor. A child that is already attached somewhere is moved.
    fn insert(&mut self, child: &Self::Node, parent: &Self::Node, anchor: Option<&Self::Node>);

    /// Replace the text of a text node, or the entire content of an element.
    fn set_element_text(&mut self, node: &Self::Node, text: &str);

    /// Set one property or listener. `next == None` clears it.
    fn patch_prop(
        &mut self,
        el: &Self::Node,
        key: &str,
        prev: Option<&PropValue>,
        next: Option<&PropValue>,
    );
}
