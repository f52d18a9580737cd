//! Per-compilation context: compiler output, debug tags and nested timings.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::compiler::{CompileOutcome, CompileRequest, Compiler};
use crate::error::WorkError;
use crate::logging::ScopeLog;
use crate::timing::TimingFrame;

/// Debug tag enabling nested timings.
pub const TIMINGS_TAG: &str = "timings";

/// Debug tag enabling option tracing.
pub const TRACE_TAG: &str = "trace";

/// Prefix of every line printed by [`CompileContext::print_lines`].
const LINE_PREFIX: &str = "|  ";

/// State of one compilation inside a task scope.
///
/// Timings are kept in a [`TimingFrame`] owned by the context and swapped
/// for a nested frame while a step runs, so the indentation depth follows
/// the call stack of [`CompileContext::execute`].
pub struct CompileContext<'a> {
    label: String,
    log: &'a mut ScopeLog,
    execution_root: String,
    start: Instant,
    timings: Option<TimingFrame>,
    tracing: bool,
}

impl<'a> CompileContext<'a> {
    pub fn new(
        log: &'a mut ScopeLog,
        label: impl Into<String>,
        execution_root: &Path,
        debug_tags: &[String],
    ) -> Self {
        let has_tag = |tag: &str| debug_tags.iter().any(|t| t == tag);

        let mut execution_root = execution_root.display().to_string();
        if !execution_root.ends_with(std::path::MAIN_SEPARATOR) {
            execution_root.push(std::path::MAIN_SEPARATOR);
        }

        Self {
            label: label.into(),
            log,
            execution_root,
            start: Instant::now(),
            timings: has_tag(TIMINGS_TAG).then(TimingFrame::root),
            tracing: has_tag(TRACE_TAG),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn log(&mut self) -> &mut ScopeLog {
        &mut *self.log
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Run a named step, timing it when timings are enabled.
    pub fn execute<T, F>(&mut self, name: &str, step: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let Some(mut frame) = self.timings.take() else {
            return step(self);
        };

        self.timings = Some(frame.nested());
        let start = Instant::now();
        let result = step(self);
        let inner = self.timings.take().unwrap_or_else(|| frame.nested());
        frame.record(name, start.elapsed(), inner);
        self.timings = Some(frame);

        result
    }

    /// Print a header followed by prefixed lines. Nothing is printed when
    /// there are no lines.
    pub fn print_lines<I, S>(&mut self, header: &str, lines: I, filter_empty: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<S> = lines
            .into_iter()
            .filter(|l| !filter_empty || !l.as_ref().trim().is_empty())
            .collect();
        if lines.is_empty() {
            return;
        }

        let _ = writeln!(self.log, "{header}:");
        for line in &lines {
            let _ = writeln!(self.log, "{LINE_PREFIX}{}", line.as_ref());
        }
        let _ = writeln!(self.log);
    }

    /// Invoke the compiler and turn a non-zero status into a
    /// [`WorkError::Compilation`] carrying the captured output.
    pub fn execute_compiler(
        &mut self,
        compiler: &dyn Compiler,
        request: &CompileRequest,
    ) -> Result<CompileOutcome, WorkError> {
        self.log.debug(|| format!("compiler arguments: {}", request.args.join(" ")));

        let mut captured = Vec::new();
        let outcome = compiler.compile(request, &mut captured)?;
        let lines: Vec<String> = String::from_utf8_lossy(&captured)
            .lines()
            .map(|line| self.trim_execution_root(line))
            .collect();

        if outcome.exit_code != 0 {
            return Err(WorkError::Compilation {
                status: outcome.exit_code,
                message: "compile phase failed".to_string(),
                output: lines,
            });
        }

        for line in &lines {
            let _ = writeln!(self.log, "{line}");
        }
        Ok(outcome)
    }

    /// Print the collected timings when the compilation succeeded and hand
    /// them to the task scope.
    pub fn finalize(mut self, successful: bool) {
        let Some(frame) = self.timings else {
            return;
        };
        let lines = frame.into_lines();

        if successful {
            let header = format!(
                "Task timings for {} (total: {} ms)",
                self.label,
                self.start.elapsed().as_millis()
            );
            let _ = writeln!(self.log, "{header}:");
            for line in &lines {
                let _ = writeln!(self.log, "{LINE_PREFIX}{line}");
            }
            let _ = writeln!(self.log);
        }
        self.log.add_profiles(lines);
    }

    fn trim_execution_root(&self, line: &str) -> String {
        line.replace(&self.execution_root, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TypeUsage;
    use crate::logging::Granularity;

    struct ScriptedCompiler {
        exit_code: i32,
        output: &'static str,
    }

    impl Compiler for ScriptedCompiler {
        fn compile(
            &self,
            _request: &CompileRequest,
            out: &mut dyn Write,
        ) -> Result<CompileOutcome, WorkError> {
            out.write_all(self.output.as_bytes())?;
            Ok(CompileOutcome {
                exit_code: self.exit_code,
                usage: Some(TypeUsage::default()),
            })
        }
    }

    fn request() -> CompileRequest {
        CompileRequest {
            args: vec!["-d".to_string(), "out".to_string()],
            working_dir: "/exec/root".into(),
            usage_output: None,
        }
    }

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_timings_are_printed_on_success() {
        let mut log = ScopeLog::new("task", Granularity::Info);
        let mut ctx = CompileContext::new(&mut log, "//pkg:lib", Path::new("/exec/root"), &tags(&["timings"]));

        ctx.execute("compile classes", |c| {
            c.execute("kotlinc", |_| ());
            c.execute("write jdeps", |_| ());
        });
        ctx.finalize(true);

        let out = log.into_contents();
        let text = out.text();
        assert!(text.contains("Task timings for //pkg:lib (total: "));
        assert!(text.contains("|   * compile classes: "));
        assert!(text.contains("|     * kotlinc: "));
        assert_eq!(out.profiles.len(), 3);
    }

    #[test]
    fn test_timings_are_not_printed_on_failure() {
        let mut log = ScopeLog::new("task", Granularity::Info);
        let mut ctx = CompileContext::new(&mut log, "//pkg:lib", Path::new("/exec/root"), &tags(&["timings"]));

        ctx.execute("compile classes", |_| ());
        ctx.finalize(false);

        let out = log.into_contents();
        assert!(!out.text().contains("Task timings"));
        assert_eq!(out.profiles.len(), 1);
    }

    #[test]
    fn test_no_timings_without_tag() {
        let mut log = ScopeLog::new("task", Granularity::Info);
        let mut ctx = CompileContext::new(&mut log, "//pkg:lib", Path::new("/exec/root"), &[]);

        let value = ctx.execute("compile classes", |_| 7);
        ctx.finalize(true);

        assert_eq!(value, 7);
        let out = log.into_contents();
        assert!(out.out.is_empty());
        assert!(out.profiles.is_empty());
    }

    #[test]
    fn test_compiler_output_is_trimmed() {
        let mut log = ScopeLog::new("task", Granularity::Info);
        let mut ctx = CompileContext::new(&mut log, "//pkg:lib", Path::new("/exec/root"), &[]);
        let compiler = ScriptedCompiler {
            exit_code: 0,
            output: "warning: /exec/root/src/Foo.kt:3: unused variable\n",
        };

        ctx.execute_compiler(&compiler, &request()).unwrap();

        let text = log.into_contents().text();
        assert!(text.contains("warning: src/Foo.kt:3: unused variable"));
        assert!(!text.contains("/exec/root"));
    }

    #[test]
    fn test_compiler_failure_carries_output() {
        let mut log = ScopeLog::new("task", Granularity::Info);
        let mut ctx = CompileContext::new(&mut log, "//pkg:lib", Path::new("/exec/root"), &[]);
        let compiler = ScriptedCompiler {
            exit_code: 2,
            output: "error: /exec/root/src/Foo.kt:1: unresolved reference: Bar\n",
        };

        let err = ctx.execute_compiler(&compiler, &request()).unwrap_err();
        match err {
            WorkError::Compilation { status, output, .. } => {
                assert_eq!(status, 2);
                assert_eq!(output, vec!["error: src/Foo.kt:1: unresolved reference: Bar"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(log.into_contents().out.is_empty());
    }

    #[test]
    fn test_print_lines_filters_empty() {
        let mut log = ScopeLog::new("task", Granularity::Info);
        let mut ctx = CompileContext::new(&mut log, "//pkg:lib", Path::new("/exec/root"), &[]);

        ctx.print_lines("Options", ["a", "", "b"], true);
        ctx.print_lines("Nothing", Vec::<String>::new(), true);

        let text = log.into_contents().text();
        assert_eq!(text, "Options:\n|  a\n|  b\n\n");
    }
}
