//! Patching
//!
//! [`Renderer`] turns tree descriptions into host operations. `patch(old,
//! new)` mounts `new` when there is no `old`, replaces `old` when the two are
//! not the same logical node, and otherwise updates the mounted host nodes in
//! place and hands them over to `new`.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use super::component::mount_component;
use super::host::HostAdapter;
use super::vnode::{same_vnode_type, Children, Props, VNode, VNodeKind};

type NodeOf<A> = <A as HostAdapter>::Node;

/// Reconciler bound to one host adapter. Cheap to clone; clones share the
/// adapter.
pub struct Renderer<A: HostAdapter> {
    host: Rc<RefCell<A>>,
}

impl<A: HostAdapter> Clone for Renderer<A> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
        }
    }
}

impl<A: HostAdapter + 'static> Renderer<A> {
    pub fn new(host: A) -> Self {
        Self {
            host: Rc::new(RefCell::new(host)),
        }
    }

    /// Shared handle to the adapter, for inspecting the host tree.
    pub fn host(&self) -> &Rc<RefCell<A>> {
        &self.host
    }

    /// A render root mounted into `container`.
    pub fn create_root(&self, container: NodeOf<A>) -> Root<A> {
        Root {
            renderer: self.clone(),
            container,
            current: None,
        }
    }

    // The borrow must never be held across a call back into the renderer.
    fn ops(&self) -> RefMut<'_, A> {
        self.host.borrow_mut()
    }

    /// Reconcile `n2` against `n1` inside `container`, inserting before
    /// `anchor` wherever something new has to be placed.
    pub fn patch(
        &self,
        n1: Option<&VNode<NodeOf<A>>>,
        n2: &mut VNode<NodeOf<A>>,
        container: &NodeOf<A>,
        anchor: Option<&NodeOf<A>>,
    ) {
        match n1 {
            None => self.mount(n2, container, anchor),
            Some(old) if same_vnode_type(old, n2) => self.patch_in_place(old, n2, container, anchor),
            Some(old) => {
                let before = old.first_host_node();
                self.mount(n2, container, before.as_ref().or(anchor));
                self.unmount(old, true);
            }
        }
    }

    fn mount(&self, vnode: &mut VNode<NodeOf<A>>, container: &NodeOf<A>, anchor: Option<&NodeOf<A>>) {
        match &mut vnode.kind {
            VNodeKind::Element { tag, props, children } => {
                let el = self.ops().create_element(tag);
                match children {
                    Children::Empty => {}
                    Children::Text(text) => self.ops().set_element_text(&el, text),
                    Children::Nodes(nodes) => self.mount_children(nodes, &el, None),
                }
                for (key, value) in props.iter() {
                    self.ops().patch_prop(&el, key, None, Some(value));
                }
                self.ops().insert(&el, container, anchor);
                vnode.el = Some(el);
            }
            VNodeKind::Text(text) => {
                let el = self.ops().create_text(text);
                self.ops().insert(&el, container, anchor);
                vnode.el = Some(el);
            }
            VNodeKind::Fragment(nodes) => {
                let (start, end) = {
                    let mut host = self.ops();
                    let start = host.create_text("");
                    let end = host.create_text("");
                    host.insert(&start, container, anchor);
                    host.insert(&end, container, anchor);
                    (start, end)
                };
                self.mount_children(nodes, container, Some(&end));
                vnode.el = Some(start);
                vnode.anchor = Some(end);
            }
            VNodeKind::Component { def, props } => {
                let handle = mount_component(self, def.clone(), props.clone(), container, anchor);
                vnode.el = handle.first_host_node();
                vnode.component = Some(handle);
            }
        }
    }

    fn mount_children(
        &self,
        nodes: &mut [VNode<NodeOf<A>>],
        container: &NodeOf<A>,
        anchor: Option<&NodeOf<A>>,
    ) {
        for node in nodes {
            self.mount(node, container, anchor);
        }
    }

    fn patch_in_place(
        &self,
        old: &VNode<NodeOf<A>>,
        new: &mut VNode<NodeOf<A>>,
        container: &NodeOf<A>,
        anchor: Option<&NodeOf<A>>,
    ) {
        match (&old.kind, &mut new.kind) {
            (
                VNodeKind::Element {
                    props: old_props,
                    children: old_children,
                    ..
                },
                VNodeKind::Element {
                    props: new_props,
                    children: new_children,
                    ..
                },
            ) => {
                let Some(el) = old.el.clone() else {
                    self.mount(new, container, anchor);
                    return;
                };
                self.patch_children(old_children, new_children, &el);
                self.patch_props(&el, old_props, new_props);
                new.el = Some(el);
            }
            (VNodeKind::Text(old_text), VNodeKind::Text(new_text)) => {
                let Some(el) = old.el.clone() else {
                    self.mount(new, container, anchor);
                    return;
                };
                if old_text != new_text {
                    self.ops().set_element_text(&el, new_text);
                }
                new.el = Some(el);
            }
            (VNodeKind::Fragment(old_nodes), VNodeKind::Fragment(new_nodes)) => {
                self.patch_keyed_children(old_nodes, new_nodes, container, old.anchor.as_ref());
                new.el = old.el.clone();
                new.anchor = old.anchor.clone();
            }
            (VNodeKind::Component { .. }, VNodeKind::Component { props, .. }) => {
                let Some(handle) = old.component.clone() else {
                    self.mount(new, container, anchor);
                    return;
                };
                handle.update(props.clone());
                new.el = handle.first_host_node();
                new.component = Some(handle);
            }
            _ => {
                tracing::warn!("in-place patch of mismatched node kinds; replacing");
                self.mount(new, container, anchor);
                self.unmount(old, true);
            }
        }
    }

    fn patch_children(
        &self,
        c1: &Children<NodeOf<A>>,
        c2: &mut Children<NodeOf<A>>,
        el: &NodeOf<A>,
    ) {
        match (c1, c2) {
            (Children::Text(old_text), Children::Text(new_text)) => {
                if old_text != new_text {
                    self.ops().set_element_text(el, new_text);
                }
            }
            (old, Children::Text(new_text)) => {
                if let Children::Nodes(nodes) = old {
                    self.unmount_children(nodes);
                }
                self.ops().set_element_text(el, new_text);
            }
            (Children::Nodes(old_nodes), Children::Nodes(new_nodes)) => {
                self.patch_keyed_children(old_nodes, new_nodes, el, None);
            }
            (old, Children::Nodes(new_nodes)) => {
                if let Children::Text(_) = old {
                    self.ops().set_element_text(el, "");
                }
                self.mount_children(new_nodes, el, None);
            }
            (Children::Nodes(old_nodes), Children::Empty) => self.unmount_children(old_nodes),
            (Children::Text(_), Children::Empty) => self.ops().set_element_text(el, ""),
            (Children::Empty, Children::Empty) => {}
        }
    }

    fn patch_props(&self, el: &NodeOf<A>, old: &Props, new: &Props) {
        if Rc::ptr_eq(old, new) {
            return;
        }
        let mut host = self.ops();
        for (key, next) in new.iter() {
            let prev = old.get(key);
            if prev != Some(next) {
                host.patch_prop(el, key, prev, Some(next));
            }
        }
        for (key, prev) in old.iter() {
            if !new.contains_key(key) {
                host.patch_prop(el, key, Some(prev), None);
            }
        }
    }

    fn unmount_children(&self, nodes: &[VNode<NodeOf<A>>]) {
        for node in nodes {
            self.unmount(node, true);
        }
    }

    /// Tear down a mounted node. Components are stopped; host nodes are
    /// detached only when `do_remove` is set, which callers clear when an
    /// ancestor's removal already takes them out of the tree.
    pub fn unmount(&self, vnode: &VNode<NodeOf<A>>, do_remove: bool) {
        match &vnode.kind {
            VNodeKind::Element { children, .. } => {
                if let Children::Nodes(nodes) = children {
                    for node in nodes {
                        self.unmount(node, false);
                    }
                }
                if do_remove {
                    if let Some(el) = &vnode.el {
                        self.ops().remove(el);
                    }
                }
            }
            VNodeKind::Text(_) => {
                if do_remove {
                    if let Some(el) = &vnode.el {
                        self.ops().remove(el);
                    }
                }
            }
            VNodeKind::Fragment(nodes) => {
                for node in nodes {
                    self.unmount(node, do_remove);
                }
                if do_remove {
                    let mut host = self.ops();
                    for anchor in [&vnode.el, &vnode.anchor].into_iter().flatten() {
                        host.remove(anchor);
                    }
                }
            }
            VNodeKind::Component { .. } => {
                if let Some(handle) = &vnode.component {
                    handle.unmount(do_remove);
                }
            }
        }
    }

    /// Move a mounted node, with its whole host subtree, before `anchor`.
    pub(crate) fn move_vnode(
        &self,
        vnode: &VNode<NodeOf<A>>,
        container: &NodeOf<A>,
        anchor: Option<&NodeOf<A>>,
    ) {
        match &vnode.kind {
            VNodeKind::Element { .. } | VNodeKind::Text(_) => {
                if let Some(el) = &vnode.el {
                    self.ops().insert(el, container, anchor);
                }
            }
            VNodeKind::Fragment(nodes) => {
                if let Some(start) = &vnode.el {
                    self.ops().insert(start, container, anchor);
                }
                for node in nodes {
                    self.move_vnode(node, container, anchor);
                }
                if let Some(end) = &vnode.anchor {
                    self.ops().insert(end, container, anchor);
                }
            }
            VNodeKind::Component { .. } => {
                if let Some(handle) = &vnode.component {
                    handle.move_to(container, anchor);
                }
            }
        }
    }
}

/// A container plus whatever is currently rendered into it.
pub struct Root<A: HostAdapter> {
    renderer: Renderer<A>,
    container: NodeOf<A>,
    current: Option<VNode<NodeOf<A>>>,
}

impl<A: HostAdapter + 'static> Root<A> {
    /// Render `vnode` into the container, patching against the previous
    /// render.
    pub fn render(&mut self, mut vnode: VNode<NodeOf<A>>) {
        let previous = self.current.take();
        self.renderer
            .patch(previous.as_ref(), &mut vnode, &self.container, None);
        self.current = Some(vnode);
    }

    /// Unmount the current tree, if any.
    pub fn unmount(&mut self) {
        if let Some(vnode) = self.current.take() {
            self.renderer.unmount(&vnode, true);
        }
    }

    pub fn current(&self) -> Option<&VNode<NodeOf<A>>> {
        self.current.as_ref()
    }

    pub fn container(&self) -> &NodeOf<A> {
        &self.container
    }

    pub fn renderer(&self) -> &Renderer<A> {
        &self.renderer
    }
}
