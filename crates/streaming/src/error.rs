use thiserror::Error;

/// Failure of the paginated data source.
///
/// There is no automatic retry; the session surfaces the message and the
/// host may trigger a full reload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("data source rejected page at offset {offset}: {message}")]
    PageRejected { offset: usize, message: String },

    #[error("data source disconnected: {message}")]
    Disconnected { message: String },
}
