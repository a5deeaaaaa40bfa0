//! Instantiating a compiled template into a tree description.

use serde::{Deserialize, Serialize};

use super::ast::{Helper, TemplateNode, TemplateRoot};
use crate::reactive::{un_ref, Reactive, Value};
use crate::renderer::VNode;

/// Parsed and transformed template, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTemplate {
    root: TemplateRoot,
}

impl CompiledTemplate {
    pub(crate) fn new(root: TemplateRoot) -> Self {
        Self { root }
    }

    pub fn ast(&self) -> &TemplateRoot {
        &self.root
    }

    pub fn helpers(&self) -> &[Helper] {
        &self.root.helpers
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }

    /// Build a tree description, reading interpolations from `scope`.
    ///
    /// Reads are tracked, so calling this inside a component render
    /// subscribes the component to exactly the paths the template shows. A
    /// single top-level node is returned as is; several are wrapped in a
    /// fragment.
    pub fn render<N>(&self, scope: &Reactive) -> VNode<N> {
        let mut nodes: Vec<VNode<N>> = self
            .root
            .children
            .iter()
            .map(|node| instantiate(node, scope))
            .collect();
        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return node;
            }
        }
        VNode::fragment(nodes)
    }
}

fn instantiate<N>(node: &TemplateNode, scope: &Reactive) -> VNode<N> {
    match node {
        TemplateNode::Element { tag, children } => {
            let children = children
                .iter()
                .map(|child| instantiate(child, scope))
                .collect();
            VNode::element(tag.as_str()).with_children(children)
        }
        TemplateNode::Text { content } => VNode::text(content.clone()),
        TemplateNode::Interpolation { content } => {
            VNode::text(resolve_path(scope, content).to_display_string())
        }
    }
}

/// Look up a dotted path like `user.name`. Refs along the way are unwrapped;
/// a missing segment yields null.
pub fn resolve_path(scope: &Reactive, path: &str) -> Value {
    let mut segments = path.split('.').map(str::trim);
    let Some(first) = segments.next() else {
        return Value::Null;
    };
    let mut current = un_ref(&scope.get(first));
    for segment in segments {
        let next = match &current {
            Value::Reactive(inner) => inner.get(segment),
            Value::Object(object) => object.get(segment),
            _ => return Value::Null,
        };
        current = un_ref(&next);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::reactive::{effect, reactive, Object, Ref};
    use crate::renderer::{MemNodeId, MemoryHost, Renderer};
    use std::cell::Cell;
    use std::rc::Rc;

    fn render_html(template: &CompiledTemplate, scope: &Reactive) -> String {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let renderer = Renderer::new(host);
        let mut root = renderer.create_root(container);
        root.render(template.render::<MemNodeId>(scope));
        let html = renderer.host().borrow().inner_html(container);
        html
    }

    #[test]
    fn renders_interpolations_from_scope() {
        let template = compile("<div>hello {{ name }}</div>").unwrap();
        let scope = reactive(&Object::from([("name", "weft")]));
        assert_eq!(render_html(&template, &scope), "<div>hello weft</div>");
    }

    #[test]
    fn resolves_nested_paths_and_refs() {
        let user = Object::from([("name", Value::from("ada")), ("age", Value::from(36))]);
        let scope = reactive(&Object::from([
            ("user", Value::from(user)),
            ("count", Value::from(Ref::new(3))),
        ]));
        assert_eq!(resolve_path(&scope, "user.name").as_str(), Some("ada"));
        assert_eq!(resolve_path(&scope, "count").as_f64(), Some(3.0));
        assert!(resolve_path(&scope, "user.missing.deeper").is_null());
        assert!(resolve_path(&scope, "nothing").is_null());
    }

    #[test]
    fn several_roots_render_as_a_fragment() {
        let template = compile("<b>{{ a }}</b><i>{{ b }}</i>").unwrap();
        let scope = reactive(&Object::from([("a", 1), ("b", 2)]));
        assert_eq!(render_html(&template, &scope), "<b>1</b><i>2</i>");
    }

    #[test]
    fn rendering_tracks_the_paths_it_reads() {
        let template = compile("<p>{{ user.name }}</p>").unwrap();
        let user = Object::from([("name", "a")]);
        let scope = reactive(&Object::from([("user", Value::from(user))]));
        let runs = Rc::new(Cell::new(0));

        let (t, s, r) = (template.clone(), scope.clone(), runs.clone());
        let _runner = effect(move || {
            let _: VNode<MemNodeId> = t.render(&s);
            r.set(r.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        let nested = scope.get("user");
        if let Value::Reactive(user) = nested {
            user.set("name", "b");
        }
        assert_eq!(runs.get(), 2);

        scope.set("unrelated", 1);
        assert_eq!(runs.get(), 2);
    }
}
