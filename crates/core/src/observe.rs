//! Build observers.
//!
//! Conversions report what they skip, repair, or emit through a
//! [`BuildObserver`] handed to them at construction time. [`LogObserver`]
//! forwards to the `log` facade; [`NoopObserver`] discards everything.

/// Log target used by [`LogObserver`].
pub const LOG_TARGET: &str = "ptext";

/// Receives diagnostics while blocks are assembled. All hooks default to no-ops.
pub trait BuildObserver {
    /// A block was closed without children and dropped.
    fn block_discarded(&self, _style: &str) {}

    /// A span was closed without text and dropped.
    fn span_discarded(&self, _marks: &[String]) {}

    /// A block was finalized into the output sequence.
    fn block_emitted(&self, _type_name: &str) {}

    /// A container (list item or quote) was reopened after a leaf interrupted it.
    fn container_resumed(&self, _style: &str) {}

    /// A rule claimed a node, suppressing default handling.
    fn rule_claimed(&self, _rule: &str, _node: &str) {}

    /// A node kind with no mapping was passed through.
    fn node_ignored(&self, _node: &str) {}

    /// A link mark was still active after its link node exited and was closed by the driver.
    fn unpaired_mark(&self, _key: &str) {}

    /// A conversion finished.
    fn finished(&self, _blocks: usize) {}
}

/// Forwards observations to the `log` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl BuildObserver for LogObserver {
    fn block_discarded(&self, style: &str) {
        log::trace!(target: LOG_TARGET, "discarding empty `{}` block", style);
    }

    fn span_discarded(&self, marks: &[String]) {
        log::trace!(target: LOG_TARGET, "discarding empty span with marks {:?}", marks);
    }

    fn block_emitted(&self, type_name: &str) {
        log::trace!(target: LOG_TARGET, "emitted `{}` block", type_name);
    }

    fn container_resumed(&self, style: &str) {
        log::debug!(target: LOG_TARGET, "reopened `{}` container after a leaf block", style);
    }

    fn rule_claimed(&self, rule: &str, node: &str) {
        log::debug!(target: LOG_TARGET, "rule `{}` claimed {} node", rule, node);
    }

    fn node_ignored(&self, node: &str) {
        log::trace!(target: LOG_TARGET, "no mapping for {} node", node);
    }

    fn unpaired_mark(&self, key: &str) {
        log::warn!(
            target: LOG_TARGET,
            "link mark `{}` outlived its link node; closing it",
            key
        );
    }

    fn finished(&self, blocks: usize) {
        log::debug!(target: LOG_TARGET, "conversion produced {} blocks", blocks);
    }
}

/// Discards all observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}
