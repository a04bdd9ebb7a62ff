#![deny(missing_docs)]
//! ptext markdown: converts markdown posts into portable text blocks.
//!
//! The markdown is parsed with markdown-rs; the resulting tree is walked once
//! and every node is offered to the configured [`MarkdownRule`]s before the
//! default node mapping drives a [`ptext_core::Builder`].

/// Markdown to blocks conversion.
pub mod driver;
/// Error types for conversion.
pub mod error;
/// Markdown parsing.
pub mod parse;
/// Rules that take over nodes before the default mapping.
pub mod rules;

pub use driver::{Definitions, MarkdownConverter, NodeContext, Options, node_name, to_blocks};
pub use error::{ConvertError, SourceLocation};
pub use parse::{ParseOptions, parse_mdast};
pub use rules::{EmbedConfig, EmbedPreset, EmbedRule, MarkdownRule, Phase, RuleOutcome, sole_link};
