//! Selection intents emitted toward the host.
//!
//! The engine does not apply host selections itself; it states what the
//! user asked for and lets the host apply and persist it. Column indices
//! refer to the 8-column row layout.

/// Row column carrying the origin label.
pub const ORIGIN_LABEL_COLUMN: usize = 2;
/// Row column carrying the destination label.
pub const DESTINATION_LABEL_COLUMN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent {
    /// Select the rows matching a label in the given column.
    SelectByLabel { column: usize, label: String },
    /// Select an explicit element-id list in the given column.
    SelectByElements { column: usize, elements: Vec<u32> },
}

/// How the host answered an intent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SinkAck {
    /// Applied immediately.
    Applied,
    /// Accepted; the host will confirm asynchronously.
    Pending,
}

/// The host side of selection handling.
pub trait SelectionSink {
    fn apply(&mut self, intent: &SelectionIntent) -> SinkAck;
}
