//! Traversal context handed to rules.

use crate::rules::Phase;
use markdown::mdast::Node;
use std::collections::HashMap;

/// Link reference definitions of one document, keyed by normalized identifier.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    urls: HashMap<String, String>,
}

impl Definitions {
    /// Collects every definition in the tree. The first definition of an identifier wins.
    pub fn collect(root: &Node) -> Self {
        let mut definitions = Self::default();
        definitions.visit(root);
        definitions
    }

    fn visit(&mut self, node: &Node) {
        if let Node::Definition(definition) = node {
            self.urls
                .entry(definition.identifier.clone())
                .or_insert_with(|| definition.url.clone());
        }
        for child in node.children().into_iter().flatten() {
            self.visit(child);
        }
    }

    /// Destination registered for `identifier`.
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.urls.get(identifier).map(String::as_str)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns true if the document defines no references.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Where a node sits in the traversal.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    /// Enter or exit.
    pub phase: Phase,
    /// Parent node, `None` for the root.
    pub parent: Option<&'a Node>,
    /// Position among the parent's children.
    pub index: usize,
    /// Reference definitions of the document.
    pub definitions: &'a Definitions,
}

impl<'a> NodeContext<'a> {
    /// Destination of a link or resolved reference link; `None` for any other node.
    pub fn link_destination<'n>(&self, node: &'n Node) -> Option<&'n str>
    where
        'a: 'n,
    {
        match node {
            Node::Link(link) => Some(link.url.as_str()),
            Node::LinkReference(reference) => self.definitions.get(&reference.identifier),
            _ => None,
        }
    }

    /// Returns true if the parent is a list item or a block quote.
    pub fn in_container(&self) -> bool {
        matches!(
            self.parent,
            Some(Node::ListItem(_)) | Some(Node::Blockquote(_))
        )
    }
}

/// Short lowercase name of a node kind, for diagnostics.
pub fn node_name(node: &Node) -> &'static str {
    match node {
        Node::Root(_) => "root",
        Node::Paragraph(_) => "paragraph",
        Node::Heading(_) => "heading",
        Node::Text(_) => "text",
        Node::Break(_) => "break",
        Node::Emphasis(_) => "emphasis",
        Node::Strong(_) => "strong",
        Node::Delete(_) => "delete",
        Node::InlineCode(_) => "inlineCode",
        Node::Code(_) => "code",
        Node::List(_) => "list",
        Node::ListItem(_) => "listItem",
        Node::Blockquote(_) => "blockquote",
        Node::Link(_) => "link",
        Node::LinkReference(_) => "linkReference",
        Node::Definition(_) => "definition",
        Node::Image(_) => "image",
        Node::ImageReference(_) => "imageReference",
        Node::ThematicBreak(_) => "thematicBreak",
        Node::Html(_) => "html",
        Node::Table(_) => "table",
        Node::TableRow(_) => "tableRow",
        Node::TableCell(_) => "tableCell",
        Node::FootnoteDefinition(_) => "footnoteDefinition",
        Node::FootnoteReference(_) => "footnoteReference",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseOptions, parse_mdast};

    #[test]
    fn first_definition_wins() {
        let tree = parse_mdast(
            "[a]: https://one.test\n[a]: https://two.test\n[b]: https://three.test\n",
            &ParseOptions::posts(),
        )
        .unwrap();
        let definitions = Definitions::collect(&tree);
        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions.get("a"), Some("https://one.test"));
        assert_eq!(definitions.get("b"), Some("https://three.test"));
    }
}
