//! AST transform pass.
//!
//! Walks the tree depth-first, lets caller-supplied node transforms rewrite
//! each node before its children are visited, and records which runtime
//! helpers the template needs.

use indexmap::IndexSet;

use super::ast::{Helper, TemplateNode, TemplateRoot};

/// A caller-supplied rewrite applied to every node.
pub type NodeTransform = Box<dyn Fn(&mut TemplateNode, &mut TransformContext)>;

#[derive(Default)]
pub struct TransformOptions {
    pub node_transforms: Vec<NodeTransform>,
}

impl TransformOptions {
    pub fn with_node_transform(
        mut self,
        transform: impl Fn(&mut TemplateNode, &mut TransformContext) + 'static,
    ) -> Self {
        self.node_transforms.push(Box::new(transform));
        self
    }
}

/// State shared by one transform pass.
#[derive(Debug, Default)]
pub struct TransformContext {
    helpers: IndexSet<Helper>,
}

impl TransformContext {
    /// Record that the template needs `helper`.
    pub fn helper(&mut self, helper: Helper) {
        self.helpers.insert(helper);
    }

    pub fn helpers(&self) -> impl Iterator<Item = Helper> + '_ {
        self.helpers.iter().copied()
    }
}

/// Run the pass over `root`, filling in `root.helpers` in first-use order.
pub fn transform(root: &mut TemplateRoot, options: &TransformOptions) {
    let mut context = TransformContext::default();
    for node in &mut root.children {
        traverse_node(node, options, &mut context);
    }
    root.helpers = context.helpers().collect();
}

fn traverse_node(node: &mut TemplateNode, options: &TransformOptions, context: &mut TransformContext) {
    for transform in &options.node_transforms {
        transform(node, context);
    }

    match node {
        TemplateNode::Interpolation { .. } => context.helper(Helper::ToDisplayString),
        TemplateNode::Element { children, .. } => {
            for child in children {
                traverse_node(child, options, context);
            }
        }
        TemplateNode::Text { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parse;

    #[test]
    fn node_transforms_rewrite_text() {
        let mut root = parse("<div>hi,{{message}}</div>").unwrap();
        let options = TransformOptions::default().with_node_transform(|node, _| {
            if let TemplateNode::Text { content } = node {
                content.push_str(" weft");
            }
        });
        transform(&mut root, &options);

        let div = &root.children[0];
        assert_eq!(div.children()[0], TemplateNode::text("hi, weft"));
    }

    #[test]
    fn interpolation_requires_display_helper() {
        let mut root = parse("<p>{{ a }}{{ b }}</p>").unwrap();
        transform(&mut root, &TransformOptions::default());
        assert_eq!(root.helpers, vec![Helper::ToDisplayString]);
    }

    #[test]
    fn static_template_needs_no_helpers() {
        let mut root = parse("<p>static</p>").unwrap();
        transform(&mut root, &TransformOptions::default());
        assert!(root.helpers.is_empty());
    }

    #[test]
    fn transforms_can_record_helpers() {
        let mut root = parse("text").unwrap();
        let options = TransformOptions::default()
            .with_node_transform(|_, context| context.helper(Helper::ToDisplayString));
        transform(&mut root, &options);
        assert_eq!(root.helpers.len(), 1);
    }
}
