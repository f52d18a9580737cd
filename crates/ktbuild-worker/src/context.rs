//! Task isolation: sandbox directories, scoped logs and failure containment.

use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::WorkError;
use crate::logging::{ContextLog, Granularity, ScopeLog};

/// Prefix of per-task sandbox directories.
const TASK_DIR_PREFIX: &str = "kotlinc";

/// Process-wide worker state shared by every task.
///
/// Holds only immutable settings, so it can be shared across concurrently
/// running tasks without locking.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    name: String,
    granularity: Granularity,
}

impl WorkerContext {
    /// Create a new WorkerContext.
    pub fn new(name: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            name: name.into(),
            granularity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Run a task in a fresh sandbox below `working_dir`.
    pub fn do_task<F>(&self, working_dir: &Path, name: &str, task: F) -> TaskResult
    where
        F: FnOnce(&mut TaskContext) -> Result<(), WorkError>,
    {
        self.do_task_with(working_dir, name, self.granularity, task)
    }

    /// Like [`WorkerContext::do_task`] with an explicit log granularity.
    pub fn do_task_with<F>(
        &self,
        working_dir: &Path,
        name: &str,
        granularity: Granularity,
        task: F,
    ) -> TaskResult
    where
        F: FnOnce(&mut TaskContext) -> Result<(), WorkError>,
    {
        let parent = ScopeLog::new(self.name.clone(), granularity);
        run_isolated(working_dir, &parent, name, task)
    }
}

/// Everything a running task may touch.
///
/// Owned exclusively by one task; the sandbox directory is removed when the
/// task finishes.
#[derive(Debug)]
pub struct TaskContext {
    root: PathBuf,
    directory: PathBuf,
    log: ScopeLog,
}

impl TaskContext {
    /// Directory the request's relative paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scratch directory owned by this task.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The task's log scope.
    pub fn log(&mut self) -> &mut ScopeLog {
        &mut self.log
    }

    /// Resolve a request path against the task root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}

/// Outcome of an isolated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Exit status, 0 on success.
    pub status: i32,

    /// Everything the task logged.
    pub log: ContextLog,
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Execute `task` in a new temporary directory below `working_dir`.
///
/// The directory is unique per call and is removed afterwards on every path:
/// success, error or panic. Errors and panics never escape; they are logged
/// into the task scope and turned into a non-zero status.
pub fn run_isolated<F>(working_dir: &Path, parent: &ScopeLog, name: &str, task: F) -> TaskResult
where
    F: FnOnce(&mut TaskContext) -> Result<(), WorkError>,
{
    info!(worker = %parent.name(), task = %name, "start task");
    let mut log = parent.narrow_to(name);

    let status = match tempfile::Builder::new()
        .prefix(TASK_DIR_PREFIX)
        .tempdir_in(working_dir)
    {
        Ok(dir) => {
            let mut ctx = TaskContext {
                root: working_dir.to_path_buf(),
                directory: dir.path().to_path_buf(),
                log,
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| task(&mut ctx)));
            log = ctx.log;

            let status = match outcome {
                Ok(Ok(())) => 0,
                Ok(Err(e)) => report_failure(&mut log, &e),
                Err(payload) => {
                    log.error(format!(
                        "ERROR: unexpected exception: {}",
                        panic_message(payload.as_ref())
                    ));
                    1
                }
            };

            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(dir = %path.display(), error = %e, "Directory cleanup failed");
            }
            status
        }
        Err(e) => {
            log.error_with(&e, "ERROR: cannot create task directory");
            1
        }
    };

    info!(worker = %parent.name(), task = %name, status, "end task");
    TaskResult {
        status,
        log: log.into_contents(),
    }
}

fn report_failure(log: &mut ScopeLog, error: &WorkError) -> i32 {
    match error {
        WorkError::Compilation {
            message, output, ..
        } => {
            for line in output {
                let _ = writeln!(log, "{line}");
            }
            log.error(format!("Compilation failure: {message}"));
        }
        e if e.is_interrupted() => log.error_with(e, "ERROR: Interrupted"),
        e if e.is_expected() => log.error(e),
        e => log.error_with(e, "ERROR: unexpected exception"),
    }
    error.exit_code()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
