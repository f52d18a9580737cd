//! Kotlin compilation with dependency reporting and strict deps.

use std::path::Path;
use std::sync::Arc;

use ktbuild_core::{check_strict_deps, classify, DependencyReport, DepsPolicy, LabelResolver};
use tracing::debug;

use crate::compile_context::CompileContext;
use crate::compiler::{CompileRequest, Compiler, TypeUsage};
use crate::context::TaskContext;
use crate::error::WorkError;
use crate::flagfile::expand_flagfile;
use crate::jar_owner::ManifestResolver;
use crate::logging::ScopeLog;
use crate::options::BuildOptions;
use crate::report_file::write_report;
use crate::worker::Work;

/// File in the task sandbox the compiler writes type usage to.
const USAGE_FILE: &str = "type-usage.json";

/// Compiles one Kotlin module per request.
pub struct KotlinBuilder {
    compiler: Arc<dyn Compiler>,
}

impl KotlinBuilder {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self { compiler }
    }

    fn build(
        &self,
        c: &mut CompileContext<'_>,
        options: &BuildOptions,
        root: &Path,
        sandbox: &Path,
        resolver: &dyn LabelResolver,
    ) -> Result<(), WorkError> {
        let needs_usage = options.output_jdeps.is_some() || options.strict_kotlin_deps.is_enabled();

        let usage = if options.has_sources() {
            let request = CompileRequest {
                args: options.compiler_args(),
                working_dir: root.to_path_buf(),
                usage_output: needs_usage.then(|| sandbox.join(USAGE_FILE)),
            };
            let outcome = c.execute("kotlinc", |c| {
                c.execute_compiler(self.compiler.as_ref(), &request)
            })?;
            outcome.usage.unwrap_or_default()
        } else {
            c.log().debug(|| "no Kotlin sources to compile".to_string());
            TypeUsage::default()
        };

        if !needs_usage {
            return Ok(());
        }

        let report = classify(
            c.label(),
            &usage.explicit,
            &usage.implicit,
            &options.direct_dependencies,
        );
        debug!(target = %report.rule_label, dependencies = report.len(), "Classified dependencies");

        if let Some(path) = &options.output_jdeps {
            let path = root.join(path);
            c.execute("write jdeps", |_| write_report(&path, &report))?;
        }

        if options.strict_kotlin_deps.is_enabled() {
            c.execute("strict deps", |c| {
                enforce_strict_deps(
                    c.log(),
                    &report,
                    &options.direct_dependencies,
                    options.strict_kotlin_deps,
                    resolver,
                )
            })?;
        }
        Ok(())
    }
}

impl Work for KotlinBuilder {
    fn invoke(&self, ctx: &mut TaskContext, args: &[String]) -> Result<(), WorkError> {
        let args = expand_flagfile(args, ctx.root())?;
        let options = BuildOptions::parse_args(&args)?;

        let root = ctx.root().to_path_buf();
        let sandbox = ctx.directory().to_path_buf();
        let resolver = ManifestResolver::new(&root);

        let mut compile =
            CompileContext::new(ctx.log(), &options.target_label, &root, &options.debug_tags);
        if compile.is_tracing() {
            compile.print_lines("Task options", options.summary_lines(), true);
        }

        let result = compile.execute("compile classes", |c| {
            self.build(c, &options, &root, &sandbox, &resolver)
        });
        compile.finalize(result.is_ok());
        result
    }
}

fn enforce_strict_deps(
    log: &mut ScopeLog,
    report: &DependencyReport,
    direct_dependencies: &[String],
    policy: DepsPolicy,
    resolver: &dyn LabelResolver,
) -> Result<(), WorkError> {
    let Some(violation) = check_strict_deps(report, direct_dependencies, resolver)? else {
        return Ok(());
    };

    if policy.fails_task() {
        log.error(violation.message());
        Err(WorkError::StrictDeps)
    } else {
        log.info(violation.message());
        Ok(())
    }
}
