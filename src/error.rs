//! Error types for seqflow.
//!
//! Withdrawal and sink rejection are normal outcomes and never show up here.
//! This type only covers the failures of the worker threads that drive the
//! concurrent engines.

use thiserror::Error;

/// Result type alias using seqflow's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by worker threads.
#[derive(Error, Debug)]
pub enum Error {
    /// A worker unwound while driving its sequence or calling user code.
    #[error("worker `{worker}` panicked: {message}")]
    WorkerPanicked {
        /// Thread name of the worker.
        worker: String,
        /// Panic message, when the payload was a string.
        message: String,
    },

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker `{worker}`: {source}")]
    Spawn {
        /// Thread name the worker would have had.
        worker: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_panicked_display_names_worker() {
        let err = Error::WorkerPanicked {
            worker: "seqflow-merge-0".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "worker `seqflow-merge-0` panicked: boom");
    }

    #[test]
    fn test_spawn_error_keeps_io_source() {
        let err = Error::Spawn {
            worker: "seqflow-split".to_string(),
            source: std::io::Error::other("no threads left"),
        };
        assert!(err.to_string().starts_with("failed to spawn worker `seqflow-split`"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
