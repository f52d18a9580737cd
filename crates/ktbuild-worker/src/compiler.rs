//! The compiler capability and its subprocess implementation.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::WorkError;

/// Environment variable naming the file the compiler writes type usage to.
pub const USAGE_OUTPUT_ENV: &str = "KTBUILD_USAGE_OUTPUT";

/// One compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Compiler arguments, sources last.
    pub args: Vec<String>,

    /// Directory the compiler runs in; relative paths resolve against it.
    pub working_dir: PathBuf,

    /// Where type usage should be written, when it is needed.
    pub usage_output: Option<PathBuf>,
}

/// Type paths observed while compiling, in `<archive>!/<inner path>` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TypeUsage {
    #[serde(default)]
    pub explicit: BTreeSet<String>,

    #[serde(default)]
    pub implicit: BTreeSet<String>,
}

impl TypeUsage {
    /// Read a usage file. A missing file means the compiler reported nothing.
    pub fn read(path: &Path) -> Result<Option<Self>, WorkError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WorkError::file(path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| WorkError::Usage {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Result of a compiler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    pub exit_code: i32,

    /// Observed type usage, when requested and reported.
    pub usage: Option<TypeUsage>,
}

/// Something that turns sources into classes.
///
/// Implementations are shared by every task of the worker and must be
/// reentrant. Compiler diagnostics are written to `out`.
pub trait Compiler: Send + Sync {
    fn compile(
        &self,
        request: &CompileRequest,
        out: &mut dyn Write,
    ) -> Result<CompileOutcome, WorkError>;
}

/// Runs a compiler launcher as a child process.
#[derive(Debug, Clone)]
pub struct SubprocessCompiler {
    launcher: PathBuf,
}

impl SubprocessCompiler {
    pub fn new(launcher: impl Into<PathBuf>) -> Self {
        Self {
            launcher: launcher.into(),
        }
    }

    pub fn launcher(&self) -> &Path {
        &self.launcher
    }
}

impl Compiler for SubprocessCompiler {
    fn compile(
        &self,
        request: &CompileRequest,
        out: &mut dyn Write,
    ) -> Result<CompileOutcome, WorkError> {
        let mut cmd = Command::new(&self.launcher);
        cmd.args(&request.args).current_dir(&request.working_dir);
        if let Some(path) = &request.usage_output {
            cmd.env(USAGE_OUTPUT_ENV, path);
        }

        debug!(
            launcher = %self.launcher.display(),
            args = request.args.len(),
            "Spawning compiler"
        );
        let output = cmd
            .output()
            .map_err(|e| WorkError::file(&self.launcher, e))?;

        out.write_all(&output.stdout)?;
        out.write_all(&output.stderr)?;

        let Some(exit_code) = output.status.code() else {
            warn!(launcher = %self.launcher.display(), "Compiler terminated by signal");
            return Err(WorkError::Interrupted);
        };

        let usage = match (&request.usage_output, exit_code) {
            (Some(path), 0) => TypeUsage::read(path)?,
            _ => None,
        };

        Ok(CompileOutcome { exit_code, usage })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str, dir: &Path, usage_output: Option<PathBuf>) -> CompileRequest {
        CompileRequest {
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: dir.to_path_buf(),
            usage_output,
        }
    }

    #[test]
    fn test_captures_output_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = SubprocessCompiler::new("sh");
        let mut out = Vec::new();

        let outcome = compiler
            .compile(&shell("echo compiling; echo oops >&2; exit 3", dir.path(), None), &mut out)
            .unwrap();

        assert_eq!(outcome.exit_code, 3);
        assert!(outcome.usage.is_none());
        assert_eq!(String::from_utf8(out).unwrap(), "compiling\noops\n");
    }

    #[test]
    fn test_reads_usage_file() {
        let dir = tempfile::tempdir().unwrap();
        let usage = dir.path().join("usage.json");
        let script = r#"echo '{"explicit":["a.jar!/a/A.class"],"implicit":["b.jar!/b/B.class"]}' > "$KTBUILD_USAGE_OUTPUT""#;
        let compiler = SubprocessCompiler::new("sh");

        let outcome = compiler
            .compile(&shell(script, dir.path(), Some(usage)), &mut Vec::new())
            .unwrap();

        let usage = outcome.usage.unwrap();
        assert!(usage.explicit.contains("a.jar!/a/A.class"));
        assert!(usage.implicit.contains("b.jar!/b/B.class"));
    }

    #[test]
    fn test_missing_usage_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = SubprocessCompiler::new("sh");

        let outcome = compiler
            .compile(
                &shell("true", dir.path(), Some(dir.path().join("usage.json"))),
                &mut Vec::new(),
            )
            .unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.usage.is_none());
    }

    #[test]
    fn test_malformed_usage_file() {
        let dir = tempfile::tempdir().unwrap();
        let usage = dir.path().join("usage.json");
        fs::write(&usage, "not json").unwrap();

        let err = TypeUsage::read(&usage).unwrap_err();
        assert!(matches!(err, WorkError::Usage { .. }));
    }

    #[test]
    fn test_missing_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = SubprocessCompiler::new(dir.path().join("no-such-kotlinc"));

        let err = compiler
            .compile(&shell("true", dir.path(), None), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, WorkError::File { .. }));
    }
}
