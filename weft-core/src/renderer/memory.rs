//! In-memory host tree.
//!
//! An arena of nodes plus a log of every host operation the renderer issued.
//! Tests assert against the serialized tree and the log; headless callers
//! can use it to render to a string.

use indexmap::IndexMap;

use super::host::HostAdapter;
use super::vnode::{Listener, PropValue};

/// Handle to a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemNodeId(usize);

impl MemNodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One call the renderer made on the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    CreateElement {
        node: MemNodeId,
        tag: String,
    },
    CreateText {
        node: MemNodeId,
        text: String,
    },
    Insert {
        child: MemNodeId,
        parent: MemNodeId,
        anchor: Option<MemNodeId>,
    },
    Remove {
        node: MemNodeId,
    },
    SetText {
        node: MemNodeId,
        text: String,
    },
    PatchProp {
        node: MemNodeId,
        key: String,
        value: Option<PropValue>,
    },
}

#[derive(Debug)]
enum MemKind {
    Element {
        tag: String,
        props: IndexMap<String, PropValue>,
    },
    Text(String),
}

#[derive(Debug)]
struct MemNode {
    kind: MemKind,
    parent: Option<MemNodeId>,
    children: Vec<MemNodeId>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<MemNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A detached element to render into. Not logged.
    pub fn create_container(&mut self, tag: &str) -> MemNodeId {
        self.alloc(MemKind::Element {
            tag: tag.to_string(),
            props: IndexMap::new(),
        })
    }

    fn alloc(&mut self, kind: MemKind) -> MemNodeId {
        let id = MemNodeId(self.nodes.len());
        self.nodes.push(MemNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, node: MemNodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|&child| child != node);
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, node: MemNodeId) -> Option<MemNodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: MemNodeId) -> &[MemNodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn tag(&self, node: MemNodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            MemKind::Element { tag, .. } => Some(tag),
            MemKind::Text(_) => None,
        }
    }

    pub fn text(&self, node: MemNodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            MemKind::Text(text) => Some(text),
            MemKind::Element { .. } => None,
        }
    }

    pub fn prop(&self, node: MemNodeId, key: &str) -> Option<&PropValue> {
        match &self.nodes.get(node.0)?.kind {
            MemKind::Element { props, .. } => props.get(key),
            MemKind::Text(_) => None,
        }
    }

    /// The listener stored under `key`. Returned by value so the caller can
    /// invoke it after releasing any borrow of the host.
    pub fn listener(&self, node: MemNodeId, key: &str) -> Option<Listener> {
        match self.prop(node, key)? {
            PropValue::Listener(listener) => Some(listener.clone()),
            _ => None,
        }
    }

    /// First attached-or-not text node with exactly this content.
    pub fn find_text(&self, text: &str) -> Option<MemNodeId> {
        self.nodes
            .iter()
            .position(|n| matches!(&n.kind, MemKind::Text(t) if t == text))
            .map(MemNodeId)
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, node: MemNodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: MemNodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else { return };
        match &n.kind {
            MemKind::Text(text) => out.push_str(text),
            MemKind::Element { .. } => {
                for &child in &n.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Markup for the node and its subtree. Listeners and `false` flags are
    /// omitted; `true` flags print as bare attributes.
    pub fn outer_html(&self, node: MemNodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Markup for the children of `node`.
    pub fn inner_html(&self, node: MemNodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: MemNodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else { return };
        match &n.kind {
            MemKind::Text(text) => out.push_str(text),
            MemKind::Element { tag, props } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in props {
                    match value {
                        PropValue::Listener(_) | PropValue::Bool(false) => {}
                        PropValue::Bool(true) => {
                            out.push(' ');
                            out.push_str(key);
                        }
                        other => {
                            out.push_str(&format!(" {key}=\"{other}\""));
                        }
                    }
                }
                out.push('>');
                for &child in &n.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl HostAdapter for MemoryHost {
    type Node = MemNodeId;

    fn create_element(&mut self, tag: &str) -> MemNodeId {
        let node = self.alloc(MemKind::Element {
            tag: tag.to_string(),
            props: IndexMap::new(),
        });
        self.ops.push(HostOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text(&mut self, text: &str) -> MemNodeId {
        let node = self.alloc(MemKind::Text(text.to_string()));
        self.ops.push(HostOp::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn remove(&mut self, node: &MemNodeId) {
        self.detach(*node);
        self.ops.push(HostOp::Remove { node: *node });
    }

    fn insert(&mut self, child: &MemNodeId, parent: &MemNodeId, anchor: Option<&MemNodeId>) {
        let (child, parent) = (*child, *parent);
        self.detach(child);

        let siblings = &mut self.nodes[parent.0].children;
        let position = match anchor {
            Some(anchor) => match siblings.iter().position(|s| s == anchor) {
                Some(position) => position,
                None => {
                    tracing::warn!(?anchor, ?parent, "insert anchor is not a child of parent; appending");
                    siblings.len()
                }
            },
            None => siblings.len(),
        };
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);

        self.ops.push(HostOp::Insert {
            child,
            parent,
            anchor: anchor.copied(),
        });
    }

    fn set_element_text(&mut self, node: &MemNodeId, text: &str) {
        let node = *node;
        if let MemKind::Text(content) = &mut self.nodes[node.0].kind {
            *content = text.to_string();
        } else {
            let children = std::mem::take(&mut self.nodes[node.0].children);
            for child in children {
                self.nodes[child.0].parent = None;
            }
            if !text.is_empty() {
                let text_node = self.alloc(MemKind::Text(text.to_string()));
                self.nodes[text_node.0].parent = Some(node);
                self.nodes[node.0].children.push(text_node);
            }
        }
        self.ops.push(HostOp::SetText {
            node,
            text: text.to_string(),
        });
    }

    fn patch_prop(
        &mut self,
        el: &MemNodeId,
        key: &str,
        _prev: Option<&PropValue>,
        next: Option<&PropValue>,
    ) {
        if let MemKind::Element { props, .. } = &mut self.nodes[el.0].kind {
            match next {
                Some(value) => {
                    props.insert(key.to_string(), value.clone());
                }
                None => {
                    props.shift_remove(key);
                }
            }
        }
        self.ops.push(HostOp::PatchProp {
            node: *el,
            key: key.to_string(),
            value: next.cloned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_respects_anchor_and_moves() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let a = host.create_text("a");
        let b = host.create_text("b");
        let c = host.create_text("c");
        host.insert(&a, &root, None);
        host.insert(&c, &root, None);
        host.insert(&b, &root, Some(&c));
        assert_eq!(host.inner_html(root), "abc");

        host.insert(&a, &root, None);
        assert_eq!(host.inner_html(root), "bca");
        assert_eq!(host.children(root).len(), 3);
    }

    #[test]
    fn set_element_text_replaces_children() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let div = host.create_element("div");
        let span = host.create_element("span");
        host.insert(&div, &root, None);
        host.insert(&span, &div, None);
        host.set_element_text(&div, "hello");
        assert_eq!(host.outer_html(div), "<div>hello</div>");
        assert_eq!(host.parent(span), None);
        assert_eq!(host.text_content(root), "hello");
    }

    #[test]
    fn props_serialize_in_insertion_order() {
        let mut host = MemoryHost::new();
        let el = host.create_element("input");
        host.patch_prop(&el, "type", None, Some(&PropValue::from("checkbox")));
        host.patch_prop(&el, "checked", None, Some(&PropValue::Bool(true)));
        host.patch_prop(&el, "hidden", None, Some(&PropValue::Bool(false)));
        host.patch_prop(&el, "onChange", None, Some(&PropValue::from(Listener::new(|| {}))));
        assert_eq!(host.outer_html(el), r#"<input type="checkbox" checked></input>"#);
        assert!(host.listener(el, "onChange").is_some());
        assert!(host.listener(el, "type").is_none());
    }

    #[test]
    fn ops_are_logged() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let t = host.create_text("x");
        host.insert(&t, &root, None);
        host.remove(&t);
        let ops = host.take_ops();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[2], HostOp::Remove { node: t });
        assert!(host.ops().is_empty());
        assert_eq!(host.inner_html(root), "");
    }
}
