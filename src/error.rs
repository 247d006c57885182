//! Unified error type.

use std::path::PathBuf;

/// The error type returned by httplog's fallible operations.
///
/// Application-level failures (404, 500, etc.) are written through a
/// [`ResponseWriter`](crate::ResponseWriter), not returned as `Error`s. This
/// type surfaces infrastructure failures: binding a port, accepting a
/// connection, or opening a log file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot open log file {}: {}", .path.display(), .source)]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
