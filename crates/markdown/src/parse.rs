//! Markdown parsing through markdown-rs.

use crate::{ConvertError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recognize bare URLs (GFM autolink literals) as links.
    pub gfm: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
}

impl ParseOptions {
    /// Defaults for short-form posts: bare URLs become links, indented code is code.
    pub const fn posts() -> Self {
        Self {
            gfm: true,
            code_indented: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// Raw HTML, tables, footnotes, strikethrough, MDX, and math stay off: they
    /// have no block mapping, and leaving them off keeps their source text
    /// visible as literal text instead of silently dropping markers.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let constructs = markdown::Constructs {
            code_indented: self.code_indented,
            gfm_autolink_literal: self.gfm,
            html_flow: false,
            html_text: false,
            ..Default::default()
        };

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::posts()
    }
}

/// Parse markdown into an MDAST tree.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, ConvertError> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| {
        ConvertError::MarkdownAdapter {
            message: err.to_string(),
            location: message_location(&err),
        }
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}
