//! Plain-text extraction over block sequences.

use crate::block::Block;

/// Concatenates the span text of every rich-text block, separating blocks with
/// a blank line. Leaf blocks (code, embeds, passthrough content) contribute
/// nothing.
///
/// # Examples
///
/// ```
/// use ptext_core::{Block, BlockContent, to_plain_text};
///
/// let blocks: Vec<Block> = vec![
///     BlockContent::new("h1").with_text("Title", Vec::<String>::new()).into(),
///     Block::code(None, "ignored"),
///     BlockContent::new("normal")
///         .with_text("Hello ", Vec::<String>::new())
///         .with_text("world", ["strong"])
///         .into(),
/// ];
/// assert_eq!(to_plain_text(&blocks), "Title\n\nHello world");
/// ```
pub fn to_plain_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for content in blocks.iter().filter_map(Block::as_text) {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        for span in &content.children {
            out.push_str(&span.text);
        }
    }
    out
}
