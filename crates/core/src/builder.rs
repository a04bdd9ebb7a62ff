//! Block builder state machine.
//!
//! The builder assembles a finalized block sequence from an imperative stream
//! of open/close/append events. Its state is:
//!
//! - the open block: nothing, a rich-text container being filled, or a leaf
//!   that was just appended by [`Builder::add_custom_block`];
//! - the open span, if any;
//! - the active-mark stack and the active-list stack;
//! - the finalized sequence.
//!
//! Transitions:
//!
//! | Event              | Open span      | Open block                        |
//! |--------------------|----------------|-----------------------------------|
//! | `start_block`      | closed         | previous closed, new container    |
//! | `end_block`        | closed         | emitted if non-empty, then none   |
//! | `start_span`       | closed, reopened with the given marks | unchanged  |
//! | `end_span`         | emitted into container if non-empty, then none | unchanged |
//! | `append_text`      | opened with no marks if none, text appended | unchanged |
//! | `start_mark`/`end_mark` | closed, reopened with the updated stack | unchanged |
//! | `start_list_item`  | closed         | list-stamped container (no-op without a list) |
//! | `end_list_item`    | closed         | as `end_block` (no-op without a list) |
//! | `add_custom_block` | closed         | previous closed, leaf appended and left open |
//! | `add_mark_def`     | unchanged      | mark def registered on the container, if any |
//!
//! Attaching span text to anything but an open container is a caller bug and
//! panics.

use crate::block::{
    Block, BlockContent, ListItem, ListKind, MarkData, MarkDef, STYLE_NORMAL, SpanContent, TYPE_BLOCK,
};
use crate::observe::{BuildObserver, LogObserver};

/// The block currently receiving events.
#[derive(Debug)]
enum OpenBlock {
    /// A rich-text block collecting spans.
    Container(BlockContent),
    /// A leaf that was appended directly to the output; holds its tag.
    Leaf(String),
}

/// Assembles blocks, spans, marks, and lists into a finalized block sequence.
///
/// One builder serves one conversion; [`Builder::finish`] consumes it.
pub struct Builder<'o> {
    blocks: Vec<Block>,
    open: Option<OpenBlock>,
    span: Option<SpanContent>,
    marks: Vec<String>,
    lists: Vec<ListKind>,
    observer: &'o dyn BuildObserver,
}

impl Default for Builder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder<'static> {
    /// Creates a builder that reports to the `log` facade.
    pub fn new() -> Self {
        Builder::with_observer(&LogObserver)
    }
}

impl<'o> Builder<'o> {
    /// Creates a builder reporting to `observer`.
    pub fn with_observer(observer: &'o dyn BuildObserver) -> Self {
        Self {
            blocks: Vec::new(),
            open: None,
            span: None,
            marks: Vec::new(),
            lists: Vec::new(),
            observer,
        }
    }

    /// Closes any open block and opens an empty container with `style`.
    pub fn start_block(&mut self, style: &str) {
        self.end_block();
        self.open = Some(OpenBlock::Container(BlockContent::new(style)));
    }

    /// Closes the open span, then emits the open container unless it has no children.
    pub fn end_block(&mut self) {
        self.end_span();
        match self.open.take() {
            Some(OpenBlock::Container(content)) if content.children.is_empty() => {
                self.observer.block_discarded(&content.style);
            }
            Some(OpenBlock::Container(content)) => {
                self.observer.block_emitted(TYPE_BLOCK);
                self.blocks.push(Block::Text(content));
            }
            Some(OpenBlock::Leaf(_)) | None => {}
        }
    }

    /// Closes any open span and opens a new one carrying a copy of `marks`.
    pub fn start_span(&mut self, marks: &[String]) {
        self.end_span();
        self.span = Some(SpanContent {
            text: String::new(),
            marks: marks.to_vec(),
        });
    }

    /// Attaches the open span to the open container; empty spans are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the span has text and no container is open (no block, or a
    /// leaf appended by [`Builder::add_custom_block`]). That only happens when
    /// a rule or the driver emits inline content outside a block.
    pub fn end_span(&mut self) {
        let Some(span) = self.span.take() else {
            return;
        };
        if span.text.is_empty() {
            self.observer.span_discarded(&span.marks);
            return;
        }
        match &mut self.open {
            Some(OpenBlock::Container(content)) => content.children.push(span),
            Some(OpenBlock::Leaf(kind)) => {
                panic!("cannot attach span {:?} to `{}` leaf block", span.text, kind)
            }
            None => panic!("cannot attach span {:?}: no block is open", span.text),
        }
    }

    /// Appends to the open span, opening an unmarked span first if needed.
    pub fn append_text(&mut self, text: &str) {
        self.span
            .get_or_insert_with(SpanContent::default)
            .text
            .push_str(text);
    }

    /// Pushes `name` onto the active marks and starts a new span.
    pub fn start_mark(&mut self, name: &str) {
        self.marks.push(name.to_string());
        self.restart_span();
    }

    /// Removes the most recent `name` from the active marks and starts a new span.
    ///
    /// Ending a mark that is not active still splits the span.
    pub fn end_mark(&mut self, name: &str) {
        if let Some(pos) = self.marks.iter().rposition(|mark| mark == name) {
            self.marks.remove(pos);
        }
        self.restart_span();
    }

    /// Active marks, most recently started first.
    pub fn active_marks(&self) -> Vec<String> {
        self.marks.iter().rev().cloned().collect()
    }

    /// Returns true if `name` is on the active-mark stack.
    pub fn is_mark_active(&self, name: &str) -> bool {
        self.marks.iter().any(|mark| mark == name)
    }

    fn restart_span(&mut self) {
        let marks = self.active_marks();
        self.start_span(&marks);
    }

    /// Enters a list of `kind`.
    pub fn start_list(&mut self, kind: ListKind) {
        self.lists.push(kind);
    }

    /// Leaves the innermost list. No-op outside a list.
    pub fn end_list(&mut self) {
        self.lists.pop();
    }

    /// Number of lists currently open.
    pub fn list_depth(&self) -> usize {
        self.lists.len()
    }

    /// Opens a `normal` block stamped with the innermost list kind and the list depth.
    /// No-op outside a list.
    pub fn start_list_item(&mut self) {
        let Some(&kind) = self.lists.last() else {
            return;
        };
        let level = u32::try_from(self.lists.len()).unwrap_or(u32::MAX);
        self.start_block(STYLE_NORMAL);
        if let Some(OpenBlock::Container(content)) = &mut self.open {
            content.list_item = Some(ListItem { kind, level });
        }
    }

    /// Closes the list item block. No-op outside a list.
    pub fn end_list_item(&mut self) {
        if !self.lists.is_empty() {
            self.end_block();
        }
    }

    /// Closes any open block and appends `block` directly to the output.
    ///
    /// The leaf stays the open block until the next block event, so inline
    /// content arriving in between is rejected by [`Builder::end_span`].
    pub fn add_custom_block(&mut self, block: Block) {
        self.end_block();
        let kind = block.type_name().to_string();
        self.observer.block_emitted(&kind);
        self.blocks.push(block);
        self.open = Some(OpenBlock::Leaf(kind));
    }

    /// Registers a mark definition on the open container and returns its key.
    ///
    /// Keys are `mark1`, `mark2`, ... in registration order within a block.
    /// Returns `None` without registering anything if no container is open.
    pub fn add_mark_def(&mut self, data: MarkData) -> Option<String> {
        let Some(OpenBlock::Container(content)) = &mut self.open else {
            return None;
        };
        let key = format!("mark{}", content.mark_defs.len() + 1);
        content.mark_defs.push(MarkDef {
            key: key.clone(),
            data,
        });
        Some(key)
    }

    /// Returns true if a rich-text container is open.
    pub fn has_open_container(&self) -> bool {
        matches!(self.open, Some(OpenBlock::Container(_)))
    }

    /// Closes any open block and returns the finalized sequence.
    pub fn finish(mut self) -> Vec<Block> {
        self.end_block();
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{LinkData, TYPE_TWEET};
    use crate::observe::NoopObserver;
    use crate::observe::testing::Recorder;
    use pretty_assertions::assert_eq;

    fn builder() -> Builder<'static> {
        Builder::with_observer(&NoopObserver)
    }

    fn link(href: &str) -> MarkData {
        MarkData::Link(LinkData {
            href: href.to_string(),
        })
    }

    fn text_block(style: &str, spans: &[(&str, &[&str])]) -> Block {
        spans
            .iter()
            .fold(BlockContent::new(style), |content, (text, marks)| {
                content.with_text(*text, marks.iter().copied())
            })
            .into()
    }

    #[test]
    fn start_block_then_text() {
        let mut b = builder();
        b.start_block("normal");
        b.append_text("Hello");
        b.end_block();
        assert_eq!(b.finish(), vec![text_block("normal", &[("Hello", &[])])]);
    }

    #[test]
    fn start_block_closes_previous_block() {
        let mut b = builder();
        b.start_block("h1");
        b.append_text("Title");
        b.start_block("normal");
        b.append_text("Body");
        assert_eq!(
            b.finish(),
            vec![
                text_block("h1", &[("Title", &[])]),
                text_block("normal", &[("Body", &[])]),
            ]
        );
    }

    #[test]
    fn empty_block_is_discarded() {
        let recorder = Recorder::default();
        let mut b = Builder::with_observer(&recorder);
        b.start_block("normal");
        b.end_block();
        b.start_block("h2");
        b.start_block("normal");
        assert_eq!(b.finish(), Vec::<Block>::new());
        assert_eq!(
            recorder.take(),
            vec!["discard block normal", "discard block h2", "discard block normal"]
        );
    }

    #[test]
    fn end_block_without_open_block_is_noop() {
        let mut b = builder();
        b.end_block();
        b.end_block();
        assert!(b.finish().is_empty());
    }

    #[test]
    fn finish_closes_trailing_block() {
        let mut b = builder();
        b.start_block("normal");
        b.append_text("tail");
        assert_eq!(b.finish(), vec![text_block("normal", &[("tail", &[])])]);
    }

    #[test]
    fn append_text_accumulates_in_one_span() {
        let mut b = builder();
        b.start_block("normal");
        b.append_text("a");
        b.append_text("\n");
        b.append_text("b");
        assert_eq!(b.finish(), vec![text_block("normal", &[("a\nb", &[])])]);
    }

    #[test]
    fn start_span_closes_open_span() {
        let mut b = builder();
        b.start_block("normal");
        b.start_span(&["em".to_string()]);
        b.append_text("one");
        b.start_span(&[]);
        b.append_text("two");
        assert_eq!(
            b.finish(),
            vec![text_block("normal", &[("one", &["em"]), ("two", &[])])]
        );
    }

    #[test]
    fn empty_span_is_discarded() {
        let recorder = Recorder::default();
        let mut b = Builder::with_observer(&recorder);
        b.start_block("normal");
        b.start_span(&["strong".to_string()]);
        b.end_span();
        b.append_text("x");
        b.end_block();
        assert_eq!(b.finish(), vec![text_block("normal", &[("x", &[])])]);
        assert_eq!(
            recorder.take(),
            vec!["discard span [\"strong\"]", "emit block"]
        );
    }

    #[test]
    fn end_span_without_span_is_noop() {
        let mut b = builder();
        b.end_span();
        b.start_block("normal");
        b.end_span();
        assert!(b.finish().is_empty());
    }

    #[test]
    #[should_panic(expected = "no block is open")]
    fn span_text_without_block_panics() {
        let mut b = builder();
        b.append_text("orphan");
        b.end_span();
    }

    #[test]
    #[should_panic(expected = "leaf block")]
    fn span_text_into_leaf_panics() {
        let mut b = builder();
        b.add_custom_block(Block::embed(TYPE_TWEET, "https://twitter.com/a/status/1"));
        b.append_text("caption");
        b.end_block();
    }

    #[test]
    fn empty_span_after_leaf_is_fine() {
        let mut b = builder();
        b.add_custom_block(Block::code(None, "x"));
        b.start_mark("em");
        b.end_mark("em");
        assert_eq!(b.finish(), vec![Block::code(None, "x")]);
    }

    #[test]
    fn marks_split_spans() {
        let mut b = builder();
        b.start_block("normal");
        b.append_text("Hello ");
        b.start_mark("strong");
        b.append_text("world");
        b.end_mark("strong");
        b.append_text(".");
        assert_eq!(
            b.finish(),
            vec![text_block(
                "normal",
                &[("Hello ", &[]), ("world", &["strong"]), (".", &[])]
            )]
        );
    }

    #[test]
    fn nested_marks_list_newest_first() {
        let mut b = builder();
        b.start_block("normal");
        b.start_mark("mark1");
        b.append_text("include ");
        b.start_mark("em");
        b.append_text("formatting");
        b.end_mark("em");
        b.end_mark("mark1");
        assert_eq!(
            b.finish(),
            vec![text_block(
                "normal",
                &[("include ", &["mark1"]), ("formatting", &["em", "mark1"])]
            )]
        );
    }

    #[test]
    fn equal_mark_runs_are_not_merged() {
        let mut b = builder();
        b.start_block("normal");
        b.start_mark("em");
        b.append_text("a");
        b.end_mark("em");
        b.start_mark("em");
        b.append_text("b");
        b.end_mark("em");
        assert_eq!(
            b.finish(),
            vec![text_block("normal", &[("a", &["em"]), ("b", &["em"])])]
        );
    }

    #[test]
    fn ending_unknown_mark_still_splits_span() {
        let mut b = builder();
        b.start_block("normal");
        b.start_mark("em");
        b.append_text("a");
        b.end_mark("strong");
        b.append_text("b");
        assert!(b.is_mark_active("em"));
        assert_eq!(
            b.finish(),
            vec![text_block("normal", &[("a", &["em"]), ("b", &["em"])])]
        );
    }

    #[test]
    fn end_mark_removes_most_recent_occurrence() {
        let mut b = builder();
        b.start_block("normal");
        b.start_mark("em");
        b.start_mark("strong");
        b.start_mark("em");
        b.end_mark("em");
        assert_eq!(b.active_marks(), vec!["strong", "em"]);
    }

    #[test]
    fn mark_without_text_produces_nothing() {
        let mut b = builder();
        b.start_block("normal");
        b.start_mark("strong");
        b.end_mark("strong");
        assert!(b.finish().is_empty());
    }

    #[test]
    fn list_items_stamp_kind_and_level() {
        let mut b = builder();
        b.start_list(ListKind::Bullet);
        b.start_list_item();
        b.append_text("top");
        b.start_list(ListKind::Number);
        b.start_list_item();
        b.append_text("nested");
        b.end_list_item();
        b.end_list();
        b.end_list_item();
        b.end_list();
        assert_eq!(
            b.finish(),
            vec![
                BlockContent::new("normal")
                    .with_text("top", Vec::<String>::new())
                    .with_list_item(ListKind::Bullet, 1)
                    .into(),
                BlockContent::new("normal")
                    .with_text("nested", Vec::<String>::new())
                    .with_list_item(ListKind::Number, 2)
                    .into(),
            ]
        );
    }

    #[test]
    fn list_item_outside_list_is_noop() {
        let mut b = builder();
        b.start_block("normal");
        b.append_text("kept");
        b.start_list_item();
        b.end_list_item();
        b.append_text(" open");
        assert_eq!(b.finish(), vec![text_block("normal", &[("kept open", &[])])]);
    }

    #[test]
    fn end_list_on_empty_stack_is_noop() {
        let mut b = builder();
        b.end_list();
        assert_eq!(b.list_depth(), 0);
        b.start_list(ListKind::Bullet);
        b.end_list();
        b.end_list();
        assert_eq!(b.list_depth(), 0);
    }

    #[test]
    fn custom_block_closes_open_block() {
        let mut b = builder();
        b.start_block("normal");
        b.append_text("before");
        b.add_custom_block(Block::code(Some("js"), "x()\n"));
        b.start_block("normal");
        b.append_text("after");
        assert_eq!(
            b.finish(),
            vec![
                text_block("normal", &[("before", &[])]),
                Block::code(Some("js"), "x()"),
                text_block("normal", &[("after", &[])]),
            ]
        );
    }

    #[test]
    fn custom_block_leaves_no_container_open() {
        let mut b = builder();
        b.add_custom_block(Block::embed(TYPE_TWEET, "u"));
        assert!(!b.has_open_container());
        assert_eq!(b.add_mark_def(link("/x")), None);
    }

    #[test]
    fn mark_def_keys_are_sequential_per_block() {
        let mut b = builder();
        b.start_block("normal");
        assert_eq!(b.add_mark_def(link("/a")).as_deref(), Some("mark1"));
        assert_eq!(b.add_mark_def(link("/b")).as_deref(), Some("mark2"));
        b.append_text("x");
        b.start_block("normal");
        assert_eq!(b.add_mark_def(link("/c")).as_deref(), Some("mark1"));
        b.append_text("y");

        let blocks = b.finish();
        let keys: Vec<Vec<&str>> = blocks
            .iter()
            .map(|block| {
                block
                    .as_text()
                    .map(|c| c.mark_defs.iter().map(|d| d.key.as_str()).collect())
                    .unwrap_or_default()
            })
            .collect();
        assert_eq!(keys, vec![vec!["mark1", "mark2"], vec!["mark1"]]);
    }

    #[test]
    fn mark_def_without_block_is_rejected() {
        let mut b = builder();
        assert_eq!(b.add_mark_def(link("/nowhere")), None);
        assert!(b.finish().is_empty());
    }

    #[test]
    fn link_mark_round() {
        let mut b = builder();
        b.start_block("normal");
        let key = b.add_mark_def(link("http://x.test")).unwrap();
        b.start_mark(&key);
        b.append_text("text");
        b.end_mark(&key);
        assert_eq!(
            b.finish(),
            vec![
                BlockContent::new("normal")
                    .with_text("text", ["mark1"])
                    .with_mark_def(MarkDef::link("mark1", "http://x.test"))
                    .into()
            ]
        );
    }
}
