//! Buffered, per-task scope logging.
//!
//! A [`ScopeLog`] never writes to a shared stream. Every scope owns its
//! buffer, so concurrently running tasks cannot interleave output; the
//! buffer is flattened into the task's response once the task finishes.
//! Records are mirrored to `tracing` at debug level for the worker's own
//! diagnostics.

use std::error::Error;
use std::fmt;
use std::io;

use chrono::Local;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the process-wide `tracing` subscriber.
///
/// Writes to stderr: stdout carries the worker protocol. Filtered by
/// `RUST_LOG`, `info` by default.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
}

/// Minimum level a scope records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    /// Info and error records.
    #[default]
    Info,
    /// Everything, including debug records.
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Severe,
    Info,
    Fine,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Severe => "SEVERE",
            Self::Info => "INFO",
            Self::Fine => "FINE",
        }
    }
}

/// Captured output of a finished scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextLog {
    /// Formatted log records and raw writes.
    pub out: Vec<u8>,

    /// Collected timing lines.
    pub profiles: Vec<String>,
}

impl ContextLog {
    /// The log as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

impl fmt::Display for ContextLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.out))
    }
}

/// A named logging scope with its own buffer.
#[derive(Debug)]
pub struct ScopeLog {
    name: String,
    source: String,
    granularity: Granularity,
    out: Vec<u8>,
    profiles: Vec<String>,
}

impl ScopeLog {
    /// Create a top-level scope.
    pub fn new(name: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            name: name.into(),
            source: "global".to_string(),
            granularity,
            out: Vec::new(),
            profiles: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Create a child scope with its own, empty buffer.
    pub fn narrow_to(&self, name: impl Into<String>) -> ScopeLog {
        ScopeLog {
            name: name.into(),
            source: self.name.clone(),
            granularity: self.granularity,
            out: Vec::new(),
            profiles: Vec::new(),
        }
    }

    pub fn info(&mut self, msg: impl fmt::Display) {
        self.log(Level::Info, &msg.to_string(), None);
    }

    pub fn error(&mut self, msg: impl fmt::Display) {
        self.log(Level::Severe, &msg.to_string(), None);
    }

    /// Record an error together with its cause chain.
    pub fn error_with(&mut self, cause: &(dyn Error + 'static), msg: impl fmt::Display) {
        self.log(Level::Severe, &msg.to_string(), Some(cause));
    }

    /// Record a debug message. The message is only built when the scope
    /// records debug output.
    pub fn debug<F>(&mut self, msg: F)
    where
        F: FnOnce() -> String,
    {
        if self.granularity >= Granularity::Debug {
            self.log(Level::Fine, &msg(), None);
        }
    }

    /// Append timing lines collected by a nested task.
    pub fn add_profiles<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.profiles.extend(lines);
    }

    /// Consume the scope and return the captured output.
    pub fn into_contents(self) -> ContextLog {
        ContextLog {
            out: self.out,
            profiles: self.profiles,
        }
    }

    fn log(&mut self, level: Level, msg: &str, cause: Option<&(dyn Error + 'static)>) {
        debug!(scope = %self.name, level = level.as_str(), "{}", msg);

        let timestamp = Local::now().format("%b %d, %Y %l:%M:%S %p");
        self.out.extend_from_slice(
            format!(
                "{timestamp} {} {}\n{}: {msg}\n",
                self.source,
                self.name,
                level.as_str()
            )
            .as_bytes(),
        );

        let mut next = cause;
        while let Some(err) = next {
            self.out
                .extend_from_slice(format!("  caused by: {err}\n").as_bytes());
            next = err.source();
        }
    }
}

/// Raw writes (e.g. compiler output) go straight into the buffer.
impl io::Write for ScopeLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
