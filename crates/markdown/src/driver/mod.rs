//! Markdown to portable text conversion.
//!
//! # Module Structure
//!
//! - `context` - Traversal context and reference definitions
//! - `walk` - Node dispatch into the block builder

mod context;
mod walk;

pub use context::{Definitions, NodeContext, node_name};

use crate::rules::{EmbedConfig, MarkdownRule};
use crate::{ConvertError, ParseOptions, parse_mdast};
use markdown::mdast::Node;
use ptext_core::{Block, BuildObserver, LogObserver};
use serde::{Deserialize, Serialize};
use walk::Walker;

/// Conversion options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Whether bare URLs are recognized as links.
    #[serde(default = "default_true")]
    pub gfm: bool,
    /// Whether indented code blocks are recognized.
    #[serde(default = "default_true")]
    pub code_indented: bool,
    /// Embed recognizers, tried in order.
    #[serde(default)]
    pub embeds: Vec<EmbedConfig>,
}

fn default_true() -> bool {
    true
}

impl Options {
    /// Parser options derived from these options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: self.gfm,
            code_indented: self.code_indented,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gfm: default_true(),
            code_indented: default_true(),
            embeds: Vec::new(),
        }
    }
}

/// Converts markdown text into portable text blocks.
///
/// A converter holds configuration only; every call builds its own builder
/// state, so one converter can serve many conversions (including from several
/// threads).
///
/// ```
/// use ptext_markdown::{EmbedRule, MarkdownConverter};
///
/// let converter = MarkdownConverter::new().with_rule(EmbedRule::tweet());
/// let blocks = converter
///     .to_blocks("https://twitter.com/jack/status/20")
///     .unwrap();
/// assert_eq!(blocks[0].type_name(), "tweet");
/// ```
pub struct MarkdownConverter {
    parse: ParseOptions,
    rules: Vec<Box<dyn MarkdownRule + Send + Sync>>,
    observer: Box<dyn BuildObserver + Send + Sync>,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// A converter with default parse options, no rules, and log output.
    pub fn new() -> Self {
        Self {
            parse: ParseOptions::default(),
            rules: Vec::new(),
            observer: Box::new(LogObserver),
        }
    }

    /// Builds a converter from serializable options, compiling every embed rule.
    pub fn from_options(options: &Options) -> Result<Self, ConvertError> {
        let mut converter = Self::new().with_parse_options(options.parse_options());
        for embed in &options.embeds {
            converter = converter.with_rule(embed.build()?);
        }
        log::debug!(
            "configured markdown converter with {} embed rules",
            converter.rules.len()
        );
        Ok(converter)
    }

    /// Replaces the parser options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Appends a rule. Rules are consulted in the order they were added.
    pub fn with_rule(mut self, rule: impl MarkdownRule + Send + Sync + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Replaces the observer receiving build diagnostics.
    pub fn with_observer(mut self, observer: impl BuildObserver + Send + Sync + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Parses `input` and converts it.
    ///
    /// Fails only if the markdown parser itself fails.
    pub fn to_blocks(&self, input: &str) -> Result<Vec<Block>, ConvertError> {
        let tree = parse_mdast(input, &self.parse)?;
        Ok(self.blocks_from_tree(&tree))
    }

    /// Converts an already parsed tree.
    pub fn blocks_from_tree(&self, root: &Node) -> Vec<Block> {
        let definitions = Definitions::collect(root);
        let mut walker = Walker::new(&self.rules, &*self.observer, &definitions);
        walker.visit(root, None, 0);
        let blocks = walker.finish();
        self.observer.finished(blocks.len());
        blocks
    }
}

/// Converts markdown to blocks with the given options.
///
/// # Examples
///
/// ```
/// use ptext_markdown::{Options, to_blocks};
///
/// let blocks = to_blocks("# Title\n\nHello **world**.", &Options::default()).unwrap();
/// assert_eq!(blocks.len(), 2);
/// ```
pub fn to_blocks(input: &str, options: &Options) -> Result<Vec<Block>, ConvertError> {
    MarkdownConverter::from_options(options)?.to_blocks(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::EmbedPreset;

    #[test]
    fn options_default_to_posts() {
        let options = Options::default();
        assert!(options.gfm);
        assert!(options.code_indented);
        assert!(options.embeds.is_empty());
        assert_eq!(options.parse_options(), ParseOptions::posts());
    }

    #[test]
    fn invalid_embed_fails_conversion_setup() {
        let options = Options {
            embeds: vec![
                EmbedPreset::Tweet.into(),
                EmbedConfig::Pattern {
                    kind: "bad".into(),
                    pattern: "(".into(),
                },
            ],
            ..Options::default()
        };
        assert!(matches!(
            MarkdownConverter::from_options(&options),
            Err(ConvertError::InvalidEmbedPattern { .. })
        ));
    }

    #[test]
    fn converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarkdownConverter>();
    }
}
