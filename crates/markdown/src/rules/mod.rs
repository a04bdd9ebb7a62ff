//! Pluggable node rules consulted before the default dispatch table.
//!
//! A converter holds an ordered list of rules. For every node, on enter and
//! on exit, each rule is offered the node in registration order; the first
//! one that claims it suppresses the default handling for that event.

mod config;
mod embed;

pub use config::{EmbedConfig, EmbedPreset};
pub use embed::{EmbedRule, sole_link};

use crate::driver::NodeContext;
use markdown::mdast::Node;
use ptext_core::Builder;

/// Which side of a node the traversal is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the node's children.
    Enter,
    /// After the node's children.
    Exit,
}

/// Result of offering a node to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule did not claim the node; keep looking.
    Unhandled,
    /// The rule handled the event; children are still visited.
    Handled,
    /// The rule handled the event and the node's children and exit event are skipped.
    /// Treated as [`RuleOutcome::Handled`] on exit.
    HandledSkipChildren,
}

/// A strategy that may take over the handling of a markdown node.
pub trait MarkdownRule {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "rule"
    }

    /// Inspect `node` and optionally drive `builder` in place of the default handling.
    fn try_handle(
        &self,
        builder: &mut Builder<'_>,
        node: &Node,
        cx: &NodeContext<'_>,
    ) -> RuleOutcome;
}

impl<F> MarkdownRule for F
where
    F: Fn(&mut Builder<'_>, &Node, &NodeContext<'_>) -> RuleOutcome,
{
    fn try_handle(
        &self,
        builder: &mut Builder<'_>,
        node: &Node,
        cx: &NodeContext<'_>,
    ) -> RuleOutcome {
        (self)(builder, node, cx)
    }
}
