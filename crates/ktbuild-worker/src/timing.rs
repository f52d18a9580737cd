//! Nested wall-clock timings for the steps of a task.

use std::time::Duration;

/// Timing lines collected at one nesting depth.
///
/// A nested step gets its own frame; when it finishes, its line and every
/// line it collected are appended to the enclosing frame. The frames follow
/// the call stack, so no counter is shared between tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingFrame {
    depth: usize,
    lines: Vec<String>,
}

impl TimingFrame {
    /// The top-level frame of a task.
    pub fn root() -> Self {
        Self::default()
    }

    /// A frame for steps nested one level below this one.
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            lines: Vec::new(),
        }
    }

    /// Record a finished step and the lines its own frame collected.
    pub fn record(&mut self, name: &str, elapsed: Duration, inner: TimingFrame) {
        self.lines.push(format!(
            "{} * {}: {} ms",
            "  ".repeat(self.depth),
            name,
            elapsed.as_millis()
        ));
        self.lines.extend(inner.lines);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
