//! Template Parser
//!
//! Recursive descent over three constructs:
//!
//! - `<name>...</name>` elements, tag names ASCII letters only. Anything
//!   between the name and the closing `>` is skipped.
//! - `{{ expr }}` interpolations. The inner text is trimmed.
//! - text runs, ending at the next `{{` or `<`.
//!
//! A list of children ends at end of input or at a closing tag that matches
//! any open ancestor (case-insensitively). The element owning the list then
//! checks the closing tag is its own; if it is not, the element is
//! unterminated.

use super::ast::{TemplateNode, TemplateRoot};
use crate::error::ParseError;

const OPEN_DELIMITER: &str = "{{";
const CLOSE_DELIMITER: &str = "}}";

struct Parser<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn advance(&mut self, len: usize) {
        self.offset += len;
    }

    fn starts_with_end_tag(&self, tag: &str) -> bool {
        let rest = self.rest();
        rest.starts_with("</")
            && rest
                .get(2..2 + tag.len())
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            && !rest[2 + tag.len()..].starts_with(|c: char| c.is_ascii_alphabetic())
    }

    fn is_end(&self, ancestors: &[String]) -> bool {
        if self.rest().is_empty() {
            return true;
        }
        ancestors
            .iter()
            .rev()
            .any(|tag| self.starts_with_end_tag(tag))
    }

    fn parse_children(&mut self, ancestors: &mut Vec<String>) -> Result<Vec<TemplateNode>, ParseError> {
        let mut nodes = Vec::new();
        while !self.is_end(ancestors) {
            let rest = self.rest();
            let node = if rest.starts_with(OPEN_DELIMITER) {
                self.parse_interpolation()?
            } else if rest.starts_with("</") {
                return Err(ParseError::UnexpectedEndTag {
                    offset: self.offset,
                });
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.parse_element(ancestors)?
            } else {
                self.parse_text()
            };
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn parse_element(&mut self, ancestors: &mut Vec<String>) -> Result<TemplateNode, ParseError> {
        let start = self.offset;
        let tag = self.parse_tag_name();
        let Some(close) = self.rest().find('>') else {
            return Err(ParseError::MissingEndTag { tag, offset: start });
        };
        self.advance(close + 1);

        ancestors.push(tag.clone());
        let children = self.parse_children(ancestors)?;
        ancestors.pop();

        if !self.starts_with_end_tag(&tag) {
            return Err(ParseError::MissingEndTag { tag, offset: start });
        }
        self.advance(2 + tag.len());
        match self.rest().find('>') {
            Some(close) => self.advance(close + 1),
            None => self.offset = self.source.len(),
        }

        Ok(TemplateNode::Element { tag, children })
    }

    /// Consumes `<` and the tag name.
    fn parse_tag_name(&mut self) -> String {
        self.advance(1);
        let name: String = self
            .rest()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        self.advance(name.len());
        name
    }

    fn parse_interpolation(&mut self) -> Result<TemplateNode, ParseError> {
        let start = self.offset;
        let inner = &self.rest()[OPEN_DELIMITER.len()..];
        let Some(close) = inner.find(CLOSE_DELIMITER) else {
            return Err(ParseError::UnterminatedInterpolation { offset: start });
        };
        let content = inner[..close].trim().to_string();
        self.advance(OPEN_DELIMITER.len() + close + CLOSE_DELIMITER.len());
        Ok(TemplateNode::Interpolation { content })
    }

    fn parse_text(&mut self) -> TemplateNode {
        let rest = self.rest();
        // A `<` that opens nothing is literal text; search past it.
        let from = usize::from(rest.starts_with('<'));
        let end = [OPEN_DELIMITER, "<"]
            .iter()
            .filter_map(|token| rest[from..].find(token).map(|i| i + from))
            .min()
            .unwrap_or(rest.len());
        let content = rest[..end].to_string();
        self.advance(end);
        TemplateNode::Text { content }
    }
}

/// Parse a template into its AST. Helpers are left empty.
pub fn parse(template: &str) -> Result<TemplateRoot, ParseError> {
    let mut parser = Parser {
        source: template,
        offset: 0,
    };
    let mut ancestors = Vec::new();
    let children = parser.parse_children(&mut ancestors)?;
    tracing::trace!(nodes = children.len(), "template parsed");
    Ok(TemplateRoot {
        children,
        helpers: Vec::new(),
    })
}
