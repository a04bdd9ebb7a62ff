//! Depth-first traversal feeding the block builder.

use super::context::{Definitions, NodeContext, node_name};
use crate::rules::{MarkdownRule, Phase, RuleOutcome};
use markdown::mdast::Node;
use ptext_core::block::{Block, LinkData, ListKind, MarkData, STYLE_BLOCKQUOTE, STYLE_NORMAL};
use ptext_core::{BuildObserver, Builder};

/// Separator appended between paragraphs sharing one list item or quote block.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

pub(crate) type Rules = [Box<dyn MarkdownRule + Send + Sync>];

/// Walks one tree into one builder.
pub(crate) struct Walker<'w> {
    builder: Builder<'w>,
    rules: &'w Rules,
    observer: &'w dyn BuildObserver,
    definitions: &'w Definitions,
}

impl<'w> Walker<'w> {
    pub(crate) fn new(
        rules: &'w Rules,
        observer: &'w dyn BuildObserver,
        definitions: &'w Definitions,
    ) -> Self {
        Self {
            builder: Builder::with_observer(observer),
            rules,
            observer,
            definitions,
        }
    }

    pub(crate) fn finish(self) -> Vec<Block> {
        self.builder.finish()
    }

    pub(crate) fn visit(&mut self, node: &'w Node, parent: Option<&'w Node>, index: usize) {
        let mut cx = NodeContext {
            phase: Phase::Enter,
            parent,
            index,
            definitions: self.definitions,
        };

        let mut link_key = None;
        match self.offer(node, &cx) {
            Some(RuleOutcome::HandledSkipChildren) => return,
            Some(_) => {}
            None => link_key = self.enter(node, &cx),
        }

        if let Some(children) = node.children() {
            for (i, child) in children.iter().enumerate() {
                self.visit(child, Some(node), i);
            }
        }

        cx.phase = Phase::Exit;
        match self.offer(node, &cx) {
            Some(_) => {
                if let Some(key) = link_key {
                    self.release_link(&key);
                }
            }
            None => self.exit(node, &cx, link_key),
        }
    }

    /// Offers the event to each rule in order; returns the first claim.
    fn offer(&mut self, node: &Node, cx: &NodeContext<'_>) -> Option<RuleOutcome> {
        for rule in self.rules {
            let outcome = rule.try_handle(&mut self.builder, node, cx);
            if outcome != RuleOutcome::Unhandled {
                self.observer.rule_claimed(rule.name(), node_name(node));
                return Some(outcome);
            }
        }
        None
    }

    /// Default enter handling. Returns the mark key of an entered link.
    fn enter(&mut self, node: &Node, cx: &NodeContext<'_>) -> Option<String> {
        match node {
            Node::Root(_) => {}
            Node::Paragraph(_) if cx.in_container() => self.enter_contained_paragraph(cx),
            Node::Paragraph(_) => self.builder.start_block(STYLE_NORMAL),
            Node::Heading(heading) => self.builder.start_block(&format!("h{}", heading.depth)),
            Node::Text(text) => self.builder.append_text(&flatten_newlines(&text.value)),
            Node::Break(_) => self.builder.append_text("\n"),
            Node::Image(image) => self.builder.append_text(&flatten_newlines(&image.alt)),
            Node::ImageReference(image) => self.builder.append_text(&flatten_newlines(&image.alt)),
            Node::Emphasis(_) => self.builder.start_mark("em"),
            Node::Strong(_) => self.builder.start_mark("strong"),
            Node::InlineCode(code) => {
                self.builder.start_mark("code");
                self.builder.append_text(&code.value);
                self.builder.end_mark("code");
            }
            Node::List(list) => self.builder.start_list(if list.ordered {
                ListKind::Number
            } else {
                ListKind::Bullet
            }),
            Node::ListItem(_) => self.builder.start_list_item(),
            Node::Blockquote(_) => self.builder.start_block(STYLE_BLOCKQUOTE),
            Node::Code(code) => self
                .builder
                .add_custom_block(Block::code(code.lang.as_deref(), &code.value)),
            Node::Link(_) | Node::LinkReference(_) => {
                let href = cx.link_destination(node)?.to_string();
                let key = self.builder.add_mark_def(MarkData::Link(LinkData { href }))?;
                self.builder.start_mark(&key);
                return Some(key);
            }
            _ => self.observer.node_ignored(node_name(node)),
        }
        None
    }

    fn exit(&mut self, node: &Node, cx: &NodeContext<'_>, link_key: Option<String>) {
        match node {
            Node::Paragraph(_) if cx.in_container() => {}
            Node::Paragraph(_) | Node::Heading(_) | Node::Blockquote(_) => self.builder.end_block(),
            Node::Emphasis(_) => self.builder.end_mark("em"),
            Node::Strong(_) => self.builder.end_mark("strong"),
            Node::List(_) => self.builder.end_list(),
            Node::ListItem(_) => self.builder.end_list_item(),
            Node::Link(_) | Node::LinkReference(_) => {
                if let Some(key) = link_key {
                    self.builder.end_mark(&key);
                }
            }
            _ => {}
        }
    }

    /// Paragraphs inside a list item or quote share the container's block.
    ///
    /// A heading, code block, or embed between two paragraphs closes that
    /// block; the container is reopened so the later paragraph has somewhere
    /// to go.
    fn enter_contained_paragraph(&mut self, cx: &NodeContext<'_>) {
        if self.builder.has_open_container() {
            if cx.index > 0 {
                self.builder.append_text(PARAGRAPH_SEPARATOR);
            }
            return;
        }
        match cx.parent {
            Some(Node::Blockquote(_)) => {
                self.observer.container_resumed(STYLE_BLOCKQUOTE);
                self.builder.start_block(STYLE_BLOCKQUOTE);
            }
            _ if self.builder.list_depth() > 0 => {
                self.observer.container_resumed(STYLE_NORMAL);
                self.builder.start_list_item();
            }
            _ => self.builder.start_block(STYLE_NORMAL),
        }
    }

    /// Closes a link mark whose exit event was claimed by a rule.
    fn release_link(&mut self, key: &str) {
        if self.builder.is_mark_active(key) {
            self.observer.unpaired_mark(key);
            self.builder.end_mark(key);
        }
    }
}

fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
