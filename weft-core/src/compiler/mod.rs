//! Template Compiler
//!
//! Turns a template string into a tree that renders against a reactive
//! scope.
//!
//! ```rust,ignore
//! let template = compile("<div>{{ greeting }}, {{ user.name }}</div>")?;
//! let scope = reactive(&Object::from([("greeting", "hi")]));
//! let vnode: VNode<MemNodeId> = template.render(&scope);
//! ```
//!
//! The pipeline is [`parse`] (text to AST), then [`transform`] (node
//! rewrites and helper collection). [`compile`] runs both with default
//! options.

mod ast;
mod parse;
mod render;
mod transform;

pub use ast::{Helper, TemplateNode, TemplateRoot};
pub use parse::parse;
pub use render::{resolve_path, CompiledTemplate};
pub use transform::{transform, NodeTransform, TransformContext, TransformOptions};

use crate::error::ParseError;

/// Parse and transform `template`.
pub fn compile(template: &str) -> Result<CompiledTemplate, ParseError> {
    compile_with(template, &TransformOptions::default())
}

/// Parse and transform `template` with caller-supplied node transforms.
pub fn compile_with(
    template: &str,
    options: &TransformOptions,
) -> Result<CompiledTemplate, ParseError> {
    let mut root = parse(template)?;
    transform(&mut root, options);
    tracing::debug!(
        nodes = root.children.len(),
        helpers = root.helpers.len(),
        "template compiled"
    );
    Ok(CompiledTemplate::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_collects_helpers() {
        let compiled = compile("<div>{{ msg }}</div>").unwrap();
        assert_eq!(compiled.helpers(), &[Helper::ToDisplayString]);
        assert_eq!(
            compiled.ast().codegen_node(),
            Some(&TemplateNode::element(
                "div",
                vec![TemplateNode::interpolation("msg")]
            ))
        );
    }

    #[test]
    fn compile_propagates_parse_errors() {
        let err = compile("<section>").unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing end tag for <section> opened at offset 0"
        );
    }
}
