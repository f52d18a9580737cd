//! Merging the dependency reports of a rule.

use ktbuild_core::{find_unused_labels, merge_reports};
use tracing::debug;

use crate::context::TaskContext;
use crate::error::WorkError;
use crate::flagfile::expand_flagfile;
use crate::jar_owner::ManifestResolver;
use crate::options::MergeOptions;
use crate::report_file::{read_report, write_report};
use crate::worker::Work;

/// Merges partial dependency reports and reports unused dependencies.
#[derive(Debug, Default)]
pub struct MergeJdeps;

impl MergeJdeps {
    pub fn new() -> Self {
        Self
    }
}

impl Work for MergeJdeps {
    fn invoke(&self, ctx: &mut TaskContext, args: &[String]) -> Result<(), WorkError> {
        let args = expand_flagfile(args, ctx.root())?;
        let options = MergeOptions::parse_args(&args)?;

        let reports = options
            .inputs
            .iter()
            .map(|input| read_report(&ctx.resolve(input)))
            .collect::<Result<Vec<_>, _>>()?;

        let merged = merge_reports(&options.target_label, reports);
        debug!(
            target = %merged.rule_label,
            inputs = options.inputs.len(),
            dependencies = merged.len(),
            "Merged dependency reports"
        );
        write_report(&ctx.resolve(&options.output), &merged)?;

        if !options.report_unused_deps.is_enabled() {
            return Ok(());
        }

        let resolver = ManifestResolver::new(ctx.root());
        let unused = find_unused_labels(&merged, &resolver)?;
        if unused.is_empty() {
            return Ok(());
        }

        ctx.log().info(unused.message());
        if options.report_unused_deps.fails_task() {
            return Err(WorkError::UnusedDeps {
                target: unused.target,
                labels: unused.labels,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{TaskResult, WorkerContext};
    use crate::jar_owner::testing::write_jar;
    use crate::logging::Granularity;
    use ktbuild_core::{DependencyKind, DependencyReport};
    use std::path::Path;

    fn run(root: &Path, args: &[&str]) -> TaskResult {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        WorkerContext::new("MergeJdeps", Granularity::Info)
            .do_task(root, "invocation", |ctx| MergeJdeps::new().invoke(ctx, &args))
    }

    fn write(root: &Path, name: &str, report: &DependencyReport) {
        write_report(&root.join(name), report).unwrap();
    }

    #[test]
    fn test_merge_keeps_strongest_kind() {
        let root = tempfile::tempdir().unwrap();
        write(
            root.path(),
            "a.jdeps",
            &DependencyReport::new("//t:a").with_dependency("x.jar", DependencyKind::Explicit),
        );
        write(
            root.path(),
            "b.jdeps",
            &DependencyReport::new("//t:b")
                .with_dependency("x.jar", DependencyKind::Unused)
                .with_dependency("y.jar", DependencyKind::Implicit),
        );

        let result = run(
            root.path(),
            &[
                "--inputs", "a.jdeps", "b.jdeps", "--output", "out.jdeps", "--target_label", "//t",
                "--report_unused_deps", "off",
            ],
        );

        assert!(result.is_success(), "{}", result.log);
        let merged = read_report(&root.path().join("out.jdeps")).unwrap();
        assert_eq!(
            merged,
            DependencyReport::new("//t")
                .with_success(true)
                .with_dependency("x.jar", DependencyKind::Explicit)
                .with_dependency("y.jar", DependencyKind::Implicit)
        );
    }

    #[test]
    fn test_unused_deps_error_fails_task() {
        let root = tempfile::tempdir().unwrap();
        write_jar(&root.path().join("used.jar"), Some("//lib:used"));
        write_jar(&root.path().join("unused.jar"), Some("//lib:unused"));
        write(
            root.path(),
            "in.jdeps",
            &DependencyReport::new("//t")
                .with_dependency("used.jar", DependencyKind::Explicit)
                .with_dependency("unused.jar", DependencyKind::Unused),
        );

        let result = run(
            root.path(),
            &[
                "--inputs", "in.jdeps", "--output", "out.jdeps", "--target_label", "//t",
                "--report_unused_deps", "error",
            ],
        );

        assert_eq!(result.status, 1);
        let text = result.log.text();
        assert!(text.contains("buildozer 'remove deps //lib:unused' //t"));
        assert!(!text.contains("//lib:used "));
        assert!(root.path().join("out.jdeps").exists());
    }

    #[test]
    fn test_unused_deps_warn_succeeds() {
        let root = tempfile::tempdir().unwrap();
        write_jar(&root.path().join("unused.jar"), Some("//lib:unused"));
        write(
            root.path(),
            "in.jdeps",
            &DependencyReport::new("//t").with_dependency("unused.jar", DependencyKind::Unused),
        );

        let result = run(
            root.path(),
            &[
                "--inputs", "in.jdeps", "--output", "out.jdeps", "--target_label", "//t",
                "--report_unused_deps", "warn",
            ],
        );

        assert!(result.is_success(), "{}", result.log);
        assert!(result.log.text().contains("Please remove the following dependencies:"));
    }

    #[test]
    fn test_label_with_one_used_archive_is_not_unused() {
        let root = tempfile::tempdir().unwrap();
        write_jar(&root.path().join("lib.jar"), Some("//lib:lib"));
        write_jar(&root.path().join("lib-resources.jar"), Some("//lib:lib"));
        write(
            root.path(),
            "in.jdeps",
            &DependencyReport::new("//t")
                .with_dependency("lib.jar", DependencyKind::Implicit)
                .with_dependency("lib-resources.jar", DependencyKind::Unused),
        );

        let result = run(
            root.path(),
            &[
                "--inputs", "in.jdeps", "--output", "out.jdeps", "--target_label", "//t",
                "--report_unused_deps", "error",
            ],
        );

        assert!(result.is_success(), "{}", result.log);
        assert!(!result.log.text().contains("Please remove"));
    }

    #[test]
    fn test_off_skips_owner_resolution() {
        let root = tempfile::tempdir().unwrap();
        // No jar on disk: resolving its owner would fail.
        write(
            root.path(),
            "in.jdeps",
            &DependencyReport::new("//t").with_dependency("missing.jar", DependencyKind::Unused),
        );

        let result = run(
            root.path(),
            &[
                "--inputs", "in.jdeps", "--output", "out.jdeps", "--target_label", "//t",
                "--report_unused_deps", "off",
            ],
        );

        assert!(result.is_success(), "{}", result.log);
    }

    #[test]
    fn test_unreadable_input_fails() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("bad.jdeps"), [0xff, 0xff]).unwrap();

        let result = run(
            root.path(),
            &[
                "--inputs", "bad.jdeps", "--output", "out.jdeps", "--target_label", "//t",
                "--report_unused_deps", "off",
            ],
        );

        assert_eq!(result.status, 1);
        assert!(result.log.text().contains("Invalid dependency report"));
        assert!(!root.path().join("out.jdeps").exists());
    }
}
