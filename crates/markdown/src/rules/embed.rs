//! Single-link paragraph recognizers for tweets, videos, and custom embeds.

use super::{MarkdownRule, Phase, RuleOutcome};
use crate::ConvertError;
use crate::driver::NodeContext;
use markdown::mdast::Node;
use once_cell::sync::Lazy;
use ptext_core::Builder;
use ptext_core::block::{Block, TYPE_TWEET, TYPE_YOUTUBE};
use regex::Regex;

static TWEET_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(?:www\.|mobile\.)?(?:twitter|x)\.com/[^/]+/status/\d+").unwrap()
});

static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(?:(?:www\.|m\.)?youtube\.com/watch\?v=|youtu\.be/)[\w-]+").unwrap()
});

/// Replaces a paragraph holding nothing but one matching link with an embed block.
///
/// Kinds without a typed embed variant produce a passthrough block carrying
/// the link under `url`.
#[derive(Debug, Clone)]
pub struct EmbedRule {
    kind: String,
    pattern: Regex,
}

impl EmbedRule {
    /// Compiles `pattern` into a rule emitting `kind` blocks.
    ///
    /// The pattern only matches when it matches at the start of the link
    /// destination, whether or not it begins with `^`.
    pub fn new(kind: impl Into<String>, pattern: &str) -> Result<Self, ConvertError> {
        let kind = kind.into();
        match Regex::new(pattern) {
            Ok(pattern) => Ok(Self::with_regex(kind, pattern)),
            Err(source) => Err(ConvertError::InvalidEmbedPattern { kind, source }),
        }
    }

    /// Builds a rule from an already compiled pattern.
    pub fn with_regex(kind: impl Into<String>, pattern: Regex) -> Self {
        Self {
            kind: kind.into(),
            pattern,
        }
    }

    /// Tweet status URLs on twitter.com or x.com.
    pub fn tweet() -> Self {
        Self::with_regex(TYPE_TWEET, TWEET_URL.clone())
    }

    /// YouTube watch URLs and youtu.be short links.
    pub fn youtube() -> Self {
        Self::with_regex(TYPE_YOUTUBE, YOUTUBE_URL.clone())
    }

    /// Block kind this rule emits.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns true if `url` is claimed by this rule.
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.find(url).is_some_and(|m| m.start() == 0)
    }
}

impl MarkdownRule for EmbedRule {
    fn name(&self) -> &str {
        &self.kind
    }

    fn try_handle(
        &self,
        builder: &mut Builder<'_>,
        node: &Node,
        cx: &NodeContext<'_>,
    ) -> RuleOutcome {
        if cx.phase != Phase::Enter || !matches!(node, Node::Paragraph(_)) {
            return RuleOutcome::Unhandled;
        }
        match sole_link(node, cx) {
            Some(url) if self.matches(url) => {
                builder.add_custom_block(Block::embed(self.kind.as_str(), url));
                RuleOutcome::HandledSkipChildren
            }
            _ => RuleOutcome::Unhandled,
        }
    }
}

/// Destination of the only link in `paragraph`, if the paragraph holds nothing else.
///
/// Empty or whitespace-only text around the link is ignored. Reference links
/// resolve through the document's definitions.
pub fn sole_link<'n>(paragraph: &'n Node, cx: &NodeContext<'n>) -> Option<&'n str> {
    let mut meaningful = paragraph.children()?.iter().filter(|child| match child {
        Node::Text(text) => !text.value.trim().is_empty(),
        _ => true,
    });
    let link = meaningful.next()?;
    if meaningful.next().is_some() {
        return None;
    }
    cx.link_destination(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweet_urls() {
        let rule = EmbedRule::tweet();
        assert!(rule.matches("https://twitter.com/jack/status/20"));
        assert!(rule.matches("https://x.com/jack/status/20?s=20"));
        assert!(rule.matches("https://mobile.twitter.com/jack/status/20"));
        assert!(!rule.matches("http://twitter.com/jack/status/20"));
        assert!(!rule.matches("https://twitter.com/jack"));
        assert!(!rule.matches("see https://twitter.com/jack/status/20"));
    }

    #[test]
    fn youtube_urls() {
        let rule = EmbedRule::youtube();
        assert!(rule.matches("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(rule.matches("https://youtube.com/watch?v=dQw4w9WgXcQ&t=42"));
        assert!(rule.matches("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!rule.matches("https://www.youtube.com/channel/UC123"));
        assert!(!rule.matches("https://vimeo.com/1234"));
    }

    #[test]
    fn custom_pattern_is_anchored_at_start() {
        let rule = EmbedRule::new("gist", r"https://gist\.github\.com/\w+/\w+").unwrap();
        assert_eq!(rule.kind(), "gist");
        assert!(rule.matches("https://gist.github.com/octo/abc123"));
        assert!(!rule.matches("mirror of https://gist.github.com/octo/abc123"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = EmbedRule::new("broken", "(unclosed").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidEmbedPattern { ref kind, .. } if kind == "broken"
        ));
        assert!(err.to_string().starts_with("Invalid pattern for `broken` embeds"));
    }
}
