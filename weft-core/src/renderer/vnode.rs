//! Tree Descriptions
//!
//! A [`VNode`] describes what the host tree should look like. Render
//! functions build fresh descriptions on every run; the reconciler compares
//! them against the previous ones and copies the mounted host handles over
//! to the new tree as it goes.
//!
//! Two nodes describe "the same" logical node when [`same_vnode_type`] says
//! so: same kind (and tag, or component definition) and the same key.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::component::{ComponentDef, ComponentHandle};

/// Stable identity of a node among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(Rc<str>),
    Int(i64),
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Str(Rc::from(key))
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Str(Rc::from(key))
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Key::Int(key)
    }
}

impl From<i32> for Key {
    fn from(key: i32) -> Self {
        Key::Int(i64::from(key))
    }
}

impl From<usize> for Key {
    fn from(key: usize) -> Self {
        Key::Int(key as i64)
    }
}

impl From<char> for Key {
    fn from(key: char) -> Self {
        Key::Str(Rc::from(key.to_string()))
    }
}

/// An event listener. Compared by identity.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn()>);

impl Listener {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)();
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}

/// Value of an element property.
#[derive(Clone, Debug)]
pub enum PropValue {
    Str(Rc<str>),
    Number(f64),
    Bool(bool),
    Listener(Listener),
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Listener(a), PropValue::Listener(b)) => Listener::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Number(n) => write!(f, "{n}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(Rc::from(s))
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(Rc::from(s))
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(f64::from(n))
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<Listener> for PropValue {
    fn from(listener: Listener) -> Self {
        PropValue::Listener(listener)
    }
}

/// Property map of an element or component. Patching skips the comparison
/// entirely when old and new are the same `Rc`.
pub type Props = Rc<IndexMap<Rc<str>, PropValue>>;

/// Build a [`Props`] map.
pub fn props<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Props
where
    K: Into<Rc<str>>,
    V: Into<PropValue>,
{
    Rc::new(
        entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect(),
    )
}

/// Content of an element.
pub enum Children<N> {
    Empty,
    Text(String),
    Nodes(Vec<VNode<N>>),
}

/// What a node describes.
pub enum VNodeKind<N> {
    Element {
        tag: Rc<str>,
        props: Props,
        children: Children<N>,
    },
    Text(String),
    /// An ordered group mounted between two empty text anchors.
    Fragment(Vec<VNode<N>>),
    Component {
        def: Rc<ComponentDef<N>>,
        props: Props,
    },
}

/// A node of a tree description.
pub struct VNode<N> {
    pub(crate) kind: VNodeKind<N>,
    pub(crate) key: Option<Key>,
    /// Host node once mounted. For fragments, the start anchor.
    pub(crate) el: Option<N>,
    /// Fragment end anchor.
    pub(crate) anchor: Option<N>,
    pub(crate) component: Option<Rc<dyn ComponentHandle<N>>>,
}

impl<N> VNode<N> {
    fn from_kind(kind: VNodeKind<N>) -> Self {
        Self {
            kind,
            key: None,
            el: None,
            anchor: None,
            component: None,
        }
    }

    /// An element with no props and no children.
    pub fn element(tag: impl Into<Rc<str>>) -> Self {
        Self::from_kind(VNodeKind::Element {
            tag: tag.into(),
            props: Props::default(),
            children: Children::Empty,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::from_kind(VNodeKind::Text(text.into()))
    }

    pub fn fragment(children: Vec<VNode<N>>) -> Self {
        Self::from_kind(VNodeKind::Fragment(children))
    }

    pub fn component(def: Rc<ComponentDef<N>>, props: Props) -> Self {
        Self::from_kind(VNodeKind::Component { def, props })
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add one prop. Ignored on text and fragment nodes.
    pub fn with_prop(mut self, key: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
        if let VNodeKind::Element { props, .. } | VNodeKind::Component { props, .. } =
            &mut self.kind
        {
            Rc::make_mut(props).insert(key.into(), value.into());
        }
        self
    }

    /// Replace the whole prop map. Ignored on text and fragment nodes.
    pub fn with_props(mut self, new_props: Props) -> Self {
        if let VNodeKind::Element { props, .. } | VNodeKind::Component { props, .. } =
            &mut self.kind
        {
            *props = new_props;
        }
        self
    }

    /// Set element children. Ignored on non-elements.
    pub fn with_children(mut self, nodes: Vec<VNode<N>>) -> Self {
        if let VNodeKind::Element { children, .. } = &mut self.kind {
            *children = Children::Nodes(nodes);
        }
        self
    }

    /// Set element text content. Ignored on non-elements.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        if let VNodeKind::Element { children, .. } = &mut self.kind {
            *children = Children::Text(text.into());
        }
        self
    }

    pub fn kind(&self) -> &VNodeKind<N> {
        &self.kind
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Host node once mounted.
    pub fn el(&self) -> Option<&N> {
        self.el.as_ref()
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            VNodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.el.is_some() || self.component.is_some()
    }

    /// The component instance behind a mounted component node.
    pub fn component_handle(&self) -> Option<&Rc<dyn ComponentHandle<N>>> {
        self.component.as_ref()
    }
}

impl<N: Clone> VNode<N> {
    /// First host node of the mounted subtree; what a sibling inserted right
    /// before this node must be anchored to.
    pub fn first_host_node(&self) -> Option<N> {
        match &self.component {
            Some(handle) => handle.first_host_node(),
            None => self.el.clone(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for VNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("VNode");
        match &self.kind {
            VNodeKind::Element { tag, props, children } => {
                out.field("tag", tag).field("props", props);
                match children {
                    Children::Empty => {}
                    Children::Text(text) => {
                        out.field("text", text);
                    }
                    Children::Nodes(nodes) => {
                        out.field("children", nodes);
                    }
                }
            }
            VNodeKind::Text(text) => {
                out.field("text", text);
            }
            VNodeKind::Fragment(nodes) => {
                out.field("fragment", nodes);
            }
            VNodeKind::Component { def, props } => {
                out.field("component", &def.name()).field("props", props);
            }
        }
        out.field("key", &self.key).field("el", &self.el).finish()
    }
}

/// The identity rule used by every diff decision: same kind, same tag or
/// component definition, same key.
pub fn same_vnode_type<N>(a: &VNode<N>, b: &VNode<N>) -> bool {
    let same_kind = match (&a.kind, &b.kind) {
        (VNodeKind::Element { tag: a, .. }, VNodeKind::Element { tag: b, .. }) => a == b,
        (VNodeKind::Text(_), VNodeKind::Text(_)) => true,
        (VNodeKind::Fragment(_), VNodeKind::Fragment(_)) => true,
        (VNodeKind::Component { def: a, .. }, VNodeKind::Component { def: b, .. }) => {
            Rc::ptr_eq(a, b)
        }
        _ => false,
    };
    same_kind && a.key == b.key
}

#[cfg(test)]
mod tests {
    use super::*;

    type Node = VNode<u32>;

    #[test]
    fn same_type_requires_tag_and_key() {
        let a: Node = VNode::element("div").with_key("a");
        assert!(same_vnode_type(&a, &VNode::element("div").with_key("a")));
        assert!(!same_vnode_type(&a, &VNode::element("div").with_key("b")));
        assert!(!same_vnode_type(&a, &VNode::element("span").with_key("a")));
        assert!(!same_vnode_type(&a, &VNode::element("div")));
        assert!(same_vnode_type::<u32>(&VNode::text("x"), &VNode::text("y")));
        assert!(!same_vnode_type::<u32>(&VNode::text("x"), &VNode::fragment(vec![])));
    }

    #[test]
    fn builder_sets_props_and_children() {
        let node: Node = VNode::element("ul")
            .with_prop("id", "list")
            .with_prop("hidden", false)
            .with_children(vec![VNode::element("li").with_text("one")]);

        let VNodeKind::Element { props, children, .. } = node.kind() else {
            panic!("expected element");
        };
        assert_eq!(props.get("id"), Some(&PropValue::from("list")));
        assert_eq!(props.get("hidden"), Some(&PropValue::Bool(false)));
        assert!(matches!(children, Children::Nodes(nodes) if nodes.len() == 1));
        assert!(!node.is_mounted());
    }

    #[test]
    fn listeners_compare_by_identity() {
        let a = Listener::new(|| {});
        let b = Listener::new(|| {});
        assert_eq!(PropValue::from(a.clone()), PropValue::from(a));
        assert_ne!(PropValue::from(b.clone()), PropValue::from(Listener::new(|| {})));
    }

    #[test]
    fn keys_from_primitives() {
        assert_eq!(Key::from("a"), Key::Str(Rc::from("a")));
        assert_eq!(Key::from(3usize), Key::Int(3));
        assert_eq!(Key::from('c'), Key::from("c"));
    }
}
