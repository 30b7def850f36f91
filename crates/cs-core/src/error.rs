//! Error types for CorrStat.

use thiserror::Error;

/// Errors raised by the task-orchestration core.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error from the persistence layer.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration key was not found on any prefix of a task's path.
    ///
    /// Recoverable: callers that have a sensible default use the `*_or`
    /// resolution variants instead of matching on this.
    #[error("configuration key not found: '{key}' (searched from path '{path}')")]
    ConfigKeyNotFound {
        /// Full path of the task that requested the key.
        path: String,
        /// The requested key.
        key: String,
    },

    /// A configuration key resolved to a value of the wrong type.
    #[error("configuration key '{key}' at '{path}' holds a {found}, expected {expected}")]
    ConfigTypeMismatch {
        /// Full path of the task that requested the key.
        path: String,
        /// The requested key.
        key: String,
        /// Type name of the stored value.
        found: &'static str,
        /// Type name the caller asked for.
        expected: &'static str,
    },

    /// The persistence backend could not be opened, or is not in the open
    /// state an operation requires (e.g. writing to a read-only store).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A named scalar was not present in an opened store.
    #[error("scalar not found in store: {0}")]
    ScalarNotFound(String),

    /// Fewer group blobs were stored for a set than the reader expected.
    #[error("group set '{set}' holds {have} groups, expected {want}")]
    GroupCountMismatch {
        /// Stable id of the group set.
        set: &'static str,
        /// Number of blobs found.
        have: usize,
        /// Number of blobs requested.
        want: usize,
    },

    /// Broken task-tree invariant: attaching an already-parented subtask,
    /// or a comparable structural misuse. Aborts the current operation,
    /// never the process.
    #[error("fatal task logic error at '{path}': {reason}")]
    FatalTaskLogic {
        /// Full path of the offending task.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// Particle/event aggregation was requested but the filter lists are
    /// empty. The lifecycle logs this and disables the feature rather than
    /// failing; the variant exists for callers that want to surface it.
    #[error("acceptance misconfiguration at '{path}': {reason}")]
    AcceptanceMisconfiguration {
        /// Full path of the task.
        path: String,
        /// What was missing.
        reason: String,
    },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
