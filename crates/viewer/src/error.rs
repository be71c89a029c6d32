use thiserror::Error;

/// Unrecoverable setup failures.
///
/// Everything else in the engine degrades (missing arcs, skipped points,
/// surfaced messages); only an unusable rendering surface aborts session
/// construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },
}
