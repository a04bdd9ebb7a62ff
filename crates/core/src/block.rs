//! Portable text block model.
//!
//! A document body is an ordered sequence of [`Block`]s. Rich-text blocks
//! carry spans and block-scoped mark definitions; everything else is a leaf
//! (code, embeds, or opaque passthrough content).

use serde_json::{Map, Value};

/// Wire tag for rich-text blocks.
pub const TYPE_BLOCK: &str = "block";
/// Wire tag for inline spans.
pub const TYPE_SPAN: &str = "span";
/// Wire tag for code blocks.
pub const TYPE_CODE: &str = "code";
/// Wire tag for embedded tweets.
pub const TYPE_TWEET: &str = "tweet";
/// Wire tag for embedded YouTube videos.
pub const TYPE_YOUTUBE: &str = "youtube";
/// Wire tag for link annotations.
pub const TYPE_LINK: &str = "link";

/// Default paragraph style.
pub const STYLE_NORMAL: &str = "normal";
/// Block quote style.
pub const STYLE_BLOCKQUOTE: &str = "blockquote";

/// Embed kinds with a typed [`Block::Embed`] representation.
pub const EMBED_KINDS: &[&str] = &[TYPE_TWEET, TYPE_YOUTUBE];

/// Inline style names that can appear in a span's marks without a matching
/// mark definition. Any other mark must be the key of a mark definition in
/// the same block; the decoder rejects spans that break this.
pub const DECORATORS: &[&str] = &["em", "strong", "code", "strike-through", "underline"];

/// One structural unit of a portable text document.
///
/// The wire tag is derived from the variant, so a block can never claim a tag
/// that disagrees with its content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Rich-text paragraph, heading, quote, or list item (`block`).
    Text(BlockContent),
    /// Inline text run (`span`).
    Span(SpanContent),
    /// Fenced or indented code (`code`).
    Code(CodeContent),
    /// Single-URL embed such as a tweet or a video.
    Embed(EmbedContent),
    /// Content of a kind the codec does not model, kept verbatim.
    Custom(CustomContent),
}

impl Block {
    /// Returns the `_type` tag this block is written with.
    pub fn type_name(&self) -> &str {
        match self {
            Block::Text(_) => TYPE_BLOCK,
            Block::Span(_) => TYPE_SPAN,
            Block::Code(_) => TYPE_CODE,
            Block::Embed(embed) => &embed.kind,
            Block::Custom(custom) => &custom.kind,
        }
    }

    /// Creates a code block, dropping a single trailing newline from `code`.
    pub fn code(language: Option<&str>, code: &str) -> Self {
        Block::Code(CodeContent {
            language: language.filter(|l| !l.is_empty()).map(str::to_string),
            code: code.strip_suffix('\n').unwrap_or(code).to_string(),
        })
    }

    /// Creates a single-URL embed of the given kind.
    ///
    /// Kinds listed in [`EMBED_KINDS`] become [`Block::Embed`]; any other kind
    /// becomes a [`Block::Custom`] carrying a `url` field, which is what the
    /// decoder produces for it.
    pub fn embed(kind: impl Into<String>, url: impl Into<String>) -> Self {
        let kind = kind.into();
        let url = url.into();
        if EMBED_KINDS.contains(&kind.as_str()) {
            Block::Embed(EmbedContent { kind, url })
        } else {
            let mut fields = Map::new();
            fields.insert("url".to_string(), Value::String(url));
            Block::Custom(CustomContent { kind, fields })
        }
    }

    /// Creates an opaque passthrough block (e.g. a `mainImage` with an asset reference).
    pub fn custom(kind: impl Into<String>, fields: Map<String, Value>) -> Self {
        Block::Custom(CustomContent {
            kind: kind.into(),
            fields,
        })
    }

    /// Returns the rich-text content if this is a `block`.
    pub fn as_text(&self) -> Option<&BlockContent> {
        match self {
            Block::Text(content) => Some(content),
            _ => None,
        }
    }
}

impl From<BlockContent> for Block {
    fn from(content: BlockContent) -> Self {
        Block::Text(content)
    }
}

impl From<SpanContent> for Block {
    fn from(content: SpanContent) -> Self {
        Block::Span(content)
    }
}

impl From<CodeContent> for Block {
    fn from(content: CodeContent) -> Self {
        Block::Code(content)
    }
}

/// Rich-text block content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockContent {
    /// Paragraph style (`normal`, `h1`..`h6`, `blockquote`).
    pub style: String,
    /// Inline runs, in document order.
    pub children: Vec<SpanContent>,
    /// Annotations referenced by key from the children's marks.
    pub mark_defs: Vec<MarkDef>,
    /// List membership, when this block is a list item.
    pub list_item: Option<ListItem>,
}

impl BlockContent {
    /// Creates an empty block with the given style.
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..Self::default()
        }
    }

    /// Appends a span with the given marks.
    pub fn with_text<S: Into<String>>(
        mut self,
        text: impl Into<String>,
        marks: impl IntoIterator<Item = S>,
    ) -> Self {
        self.children.push(SpanContent::new(text, marks));
        self
    }

    /// Stamps the block as a list item.
    pub fn with_list_item(mut self, kind: ListKind, level: u32) -> Self {
        self.list_item = Some(ListItem { kind, level });
        self
    }

    /// Registers a mark definition.
    pub fn with_mark_def(mut self, mark_def: MarkDef) -> Self {
        self.mark_defs.push(mark_def);
        self
    }

    /// Looks up a mark definition by key.
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }

    /// Concatenated text of all children.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }
}

/// List membership of a rich-text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    /// Kind of the innermost enclosing list.
    pub kind: ListKind,
    /// 1-based nesting depth.
    pub level: u32,
}

/// Kind of list a list-item block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Unordered list.
    Bullet,
    /// Ordered list.
    Number,
}

impl ListKind {
    /// Wire name of the list kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Bullet => "bullet",
            ListKind::Number => "number",
        }
    }

    /// Parses a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bullet" => Some(ListKind::Bullet),
            "number" => Some(ListKind::Number),
            _ => None,
        }
    }
}

/// Inline text run sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanContent {
    /// Literal text.
    pub text: String,
    /// Decorator names or mark definition keys.
    pub marks: Vec<String>,
}

impl SpanContent {
    /// Creates a span.
    pub fn new<S: Into<String>>(
        text: impl Into<String>,
        marks: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a span without marks.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }
}

/// Block-scoped annotation addressed by a generated key.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkDef {
    /// Key referenced from span marks, unique within the enclosing block.
    pub key: String,
    /// Type-specific payload.
    pub data: MarkData,
}

impl MarkDef {
    /// Creates a link annotation.
    pub fn link(key: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data: MarkData::Link(LinkData { href: href.into() }),
        }
    }

    /// Returns the `_type` tag of the annotation.
    pub fn type_name(&self) -> &str {
        self.data.type_name()
    }
}

/// Payload of a mark definition.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkData {
    /// Hyperlink.
    Link(LinkData),
    /// Annotation type the codec does not model.
    Other {
        /// `_type` of the annotation.
        kind: String,
        /// Remaining fields, without `_type` and `_key`.
        fields: Map<String, Value>,
    },
}

impl MarkData {
    /// Returns the `_type` tag of the payload.
    pub fn type_name(&self) -> &str {
        match self {
            MarkData::Link(_) => TYPE_LINK,
            MarkData::Other { kind, .. } => kind,
        }
    }
}

/// Hyperlink annotation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkData {
    /// Link destination.
    pub href: String,
}

/// Code block content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeContent {
    /// Info-string language. Never `Some("")`: [`Block::code`] and the decoder
    /// both map an empty language to `None`.
    pub language: Option<String>,
    /// Literal code.
    pub code: String,
}

/// Single-URL embed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedContent {
    /// `_type` of the embed, one of [`EMBED_KINDS`].
    pub kind: String,
    /// Embedded resource URL.
    pub url: String,
}

/// Passthrough content for kinds the codec does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomContent {
    /// `_type` of the block.
    pub kind: String,
    /// All fields except `_type`.
    pub fields: Map<String, Value>,
}
