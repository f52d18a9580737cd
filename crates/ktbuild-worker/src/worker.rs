//! Worker modes and the unit-of-work abstraction.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::connection::PersistentWorker;
use crate::context::{TaskContext, WorkerContext};
use crate::error::{WorkError, WorkerError};

/// Process argument selecting persistent mode.
pub const PERSISTENT_WORKER_FLAG: &str = "--persistent_worker";

/// Name of the single task run in invocation mode.
pub const INVOCATION_TASK: &str = "invocation";

/// One kind of build action, invoked once per request.
///
/// Implementations are shared by every concurrently running task and must
/// not keep per-request state.
pub trait Work: Send + Sync + 'static {
    fn invoke(&self, ctx: &mut TaskContext, args: &[String]) -> Result<(), WorkError>;
}

impl<F> Work for F
where
    F: Fn(&mut TaskContext, &[String]) -> Result<(), WorkError> + Send + Sync + 'static,
{
    fn invoke(&self, ctx: &mut TaskContext, args: &[String]) -> Result<(), WorkError> {
        self(ctx, args)
    }
}

/// How the worker process serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One request built from the process arguments.
    Invocation,
    /// Length-delimited requests on stdin until it closes.
    Persistent,
}

impl Mode {
    pub fn from_args(args: &[String]) -> Self {
        if args.iter().any(|a| a == PERSISTENT_WORKER_FLAG) {
            Self::Persistent
        } else {
            Self::Invocation
        }
    }
}

/// Runs a single request and prints its log.
pub struct InvocationWorker {
    context: WorkerContext,
    work: Arc<dyn Work>,
}

impl InvocationWorker {
    pub fn new(context: WorkerContext, work: Arc<dyn Work>) -> Self {
        Self { context, work }
    }

    /// Run `args` in `working_dir`, write the task log to `out` and return
    /// the task status.
    pub fn run(&self, working_dir: &Path, args: &[String], out: &mut dyn Write) -> i32 {
        let result = self
            .context
            .do_task(working_dir, INVOCATION_TASK, |ctx| self.work.invoke(ctx, args));

        if let Err(e) = out.write_all(&result.log.out).and_then(|()| out.flush()) {
            error!(error = %e, "Failed to print task log");
        }
        result.status
    }
}

/// Serve `work` in the mode selected by `args`.
///
/// Returns the process exit status. Only failures of the worker itself are
/// returned as errors.
pub async fn run_worker(
    name: &str,
    config: &Config,
    work: Arc<dyn Work>,
    args: Vec<String>,
) -> Result<i32, WorkerError> {
    let context = WorkerContext::new(name, config.granularity());
    let working_dir = env::current_dir().map_err(WorkerError::WorkingDir)?;

    match Mode::from_args(&args) {
        Mode::Persistent => {
            info!(worker = %name, dir = %working_dir.display(), "Starting persistent worker");
            PersistentWorker::new(context, work, working_dir)
                .run(tokio::io::stdin(), tokio::io::stdout())
                .await?;
            Ok(0)
        }
        Mode::Invocation => {
            let worker = InvocationWorker::new(context, work);
            tokio::task::spawn_blocking(move || {
                worker.run(&working_dir, &args, &mut io::stdout().lock())
            })
            .await
            .map_err(|e| WorkerError::Runner(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Granularity;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_mode_from_args() {
        assert_eq!(Mode::from_args(&args(&["--persistent_worker"])), Mode::Persistent);
        assert_eq!(
            Mode::from_args(&args(&["--flagfile=x-1.params", "--persistent_worker"])),
            Mode::Persistent
        );
        assert_eq!(Mode::from_args(&args(&["--target_label", "//a"])), Mode::Invocation);
        assert_eq!(Mode::from_args(&[]), Mode::Invocation);
    }

    #[test]
    fn test_invocation_prints_log_and_returns_status() {
        let root = tempfile::tempdir().unwrap();
        let work: Arc<dyn Work> = Arc::new(|ctx: &mut TaskContext, args: &[String]| {
            ctx.log().info(format!("args: {}", args.join(" ")));
            if args.is_empty() {
                Err(WorkError::Argument("no arguments".to_string()))
            } else {
                Ok(())
            }
        });
        let worker = InvocationWorker::new(WorkerContext::new("test", Granularity::Info), work);

        let mut out = Vec::new();
        assert_eq!(worker.run(root.path(), &args(&["a", "b"]), &mut out), 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("test invocation\nINFO: args: a b"));

        let mut out = Vec::new();
        assert_eq!(worker.run(root.path(), &[], &mut out), 1);
        assert!(String::from_utf8(out).unwrap().contains("Invalid arguments: no arguments"));
    }
}
