//! Worker error types.
//!
//! [`WorkError`] is raised inside a task and always ends up as an exit status
//! plus captured log. [`WorkerError`] is raised by the worker process itself;
//! protocol failures are the only errors that stop the worker.

use std::io;
use std::path::PathBuf;

use ktbuild_proto::ConvertError;
use thiserror::Error;

/// Errors raised while executing one unit of work.
#[derive(Debug, Error)]
pub enum WorkError {
    /// Missing or malformed flag.
    #[error("Invalid arguments: {0}")]
    Argument(String),

    /// The compiler returned a non-zero status.
    #[error("Compilation failure: {message}")]
    Compilation {
        status: i32,
        message: String,
        /// Compiler output captured before the failure.
        output: Vec<String>,
    },

    /// Strict deps violations under the `error` policy.
    #[error("Strict Deps Violations - please fix")]
    StrictDeps,

    /// Unused dependencies under the `error` policy.
    #[error("Unused dependencies found for {target}: {}", .labels.join(" "))]
    UnusedDeps { target: String, labels: Vec<String> },

    /// The task was interrupted before finishing.
    #[error("Interrupted")]
    Interrupted,

    /// Filesystem failure on a specific path.
    #[error("I/O error on '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Other filesystem or process failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A dependency report could not be parsed.
    #[error("Invalid dependency report '{}': {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },

    /// The compiler's type-usage file could not be parsed.
    #[error("Invalid type usage file '{}': {source}", .path.display())]
    Usage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Anything else, including panics inside the task.
    #[error("{0}")]
    Unexpected(String),
}

impl WorkError {
    /// Attach a path to an I/O error.
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Exit status reported for this error.
    ///
    /// Compiler failures keep the compiler's status; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Compilation { status, .. } => *status,
            _ => 1,
        }
    }

    /// Returns true for interruption-class failures.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Interrupted => true,
            Self::Io(e) | Self::File { source: e, .. } => e.kind() == io::ErrorKind::Interrupted,
            _ => false,
        }
    }

    /// Returns true for failures the task anticipated and already explained.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Argument(_) | Self::Compilation { .. } | Self::StrictDeps | Self::UnusedDeps { .. }
        )
    }
}

/// Errors raised by the worker process outside any task.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Reading or writing the worker protocol failed.
    #[error("Worker protocol I/O failed: {0}")]
    Protocol(#[source] io::Error),

    /// The process working directory could not be determined.
    #[error("Cannot determine working directory: {0}")]
    WorkingDir(#[source] io::Error),

    /// A task runner failed outside the isolation boundary.
    #[error("Task runner failed: {0}")]
    Runner(String),
}
