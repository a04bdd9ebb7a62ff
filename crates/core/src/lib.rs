#![deny(missing_docs)]
//! ptext core: the portable text block model, its JSON codec, and the block
//! builder that markdown conversion drives.

/// Portable text block model.
pub mod block;
/// Block builder state machine.
pub mod builder;
/// JSON encode/decode of block sequences.
pub mod codec;
/// Codec error types.
pub mod error;
/// Build observers (logging hooks).
pub mod observe;
/// Plain-text extraction.
pub mod plain_text;

pub use block::{
    Block, BlockContent, CodeContent, CustomContent, EmbedContent, LinkData, ListItem, ListKind,
    MarkData, MarkDef, SpanContent,
};
pub use builder::Builder;
pub use codec::{decode, decode_block, decode_value, encode, encode_value};
pub use error::{CodecError, DecodeError, UnsupportedContentError};
pub use observe::{BuildObserver, LogObserver, NoopObserver};
pub use plain_text::to_plain_text;
