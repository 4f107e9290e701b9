//! Error taxonomy for document resolution.
//!
//! Every failure is fatal to the enclosing parse call; no partial output is
//! produced. Errors carry the source name and line number needed to locate
//! the failure in the original document tree.

use yoink_source::SourceError;

use crate::handler::BoxError;

/// Fatal resolution failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The top-level input stream could not be fully consumed.
    #[error("failed to read input: {0}")]
    Read(#[source] std::io::Error),

    /// A line invokes a command with no registered handler.
    #[error("{source_name}:{line}: unknown directive {command:?}")]
    UnknownDirective {
        command: String,
        source_name: String,
        line: usize,
    },

    /// Local or remote content could not be fetched.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// An include re-enters a document already on the current resolution
    /// path.
    #[error("inclusion cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// Non-cyclic nesting ran past the configured depth cap.
    #[error("{source_name}: include depth exceeds {depth}")]
    DepthExceeded { source_name: String, depth: usize },

    /// A handler reported a failure of its own.
    #[error("{source_name}:{line}: directive {command:?} failed: {source}")]
    Handler {
        command: String,
        source_name: String,
        line: usize,
        #[source]
        source: BoxError,
    },

    /// The caller's cancellation token fired before resolution finished.
    #[error("parse cancelled")]
    Cancelled,
}
