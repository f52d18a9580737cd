//! ktbuild Worker
//!
//! A Bazel persistent worker for Kotlin compilation. Requests arrive as
//! length-delimited protobuf messages on stdin (or once, from the process
//! arguments) and each one runs in its own sandbox directory with a buffered
//! log that becomes the response output.
//!
//! Two build actions are provided: [`tasks::KotlinBuilder`] compiles a module
//! and writes its dependency report, [`tasks::MergeJdeps`] merges the reports
//! of a rule and flags unused dependencies.

pub mod compile_context;
pub mod compiler;
pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod flagfile;
pub mod jar_owner;
pub mod logging;
pub mod options;
pub mod report_file;
pub mod tasks;
pub mod timing;
pub mod worker;

// Re-export commonly used types
pub use compiler::{CompileOutcome, CompileRequest, Compiler, SubprocessCompiler, TypeUsage};
pub use config::Config;
pub use connection::PersistentWorker;
pub use context::{TaskContext, TaskResult, WorkerContext};
pub use error::{WorkError, WorkerError};
pub use logging::{init_tracing, Granularity};
pub use worker::{run_worker, InvocationWorker, Mode, Work};
