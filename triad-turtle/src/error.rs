//! Error types for the Turtle triple source.

/// Error raised while reading a Turtle-line stream.
///
/// `position` is the byte offset at which reading stopped.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// A resource or delimiter was malformed or truncated.
    #[error("invalid {part} at byte {position} while loading")]
    Malformed { part: &'static str, position: u64 },

    /// The underlying stream failed.
    #[error("I/O error at byte {position}: {source}")]
    Io {
        position: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for Turtle operations.
pub type Result<T> = std::result::Result<T, TurtleError>;
