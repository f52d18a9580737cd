//! Typed task options parsed from expanded request arguments.

use std::fmt;
use std::str::FromStr;

use clap::{ArgAction, Parser};
use ktbuild_core::DepsPolicy;

use crate::error::WorkError;

/// Platform handled by this builder.
const JVM_PLATFORM: &str = "jvm";

/// A `kt_<platform>_<kind>` rule kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleKind {
    pub platform: String,
    pub kind: String,
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (platform, kind) = s
            .strip_prefix("kt_")
            .and_then(|rest| rest.split_once('_'))
            .filter(|(platform, kind)| !platform.is_empty() && !kind.is_empty())
            .ok_or_else(|| format!("invalid rule kind '{s}', expected kt_<platform>_<kind>"))?;

        if platform != JVM_PLATFORM {
            return Err(format!("unsupported platform '{platform}' in rule kind '{s}'"));
        }

        Ok(Self {
            platform: platform.to_string(),
            kind: kind.to_string(),
        })
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kt_{}_{}", self.platform, self.kind)
    }
}

fn parse_module_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("module name must not be blank".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Options of a Kotlin compile task.
#[derive(Parser, Debug, Clone)]
#[command(name = "kotlin-builder", no_binary_name = true, disable_help_flag = true)]
pub struct BuildOptions {
    /// Label of the rule being built
    #[arg(long = "target_label")]
    pub target_label: String,

    /// Rule kind, e.g. kt_jvm_library
    #[arg(long = "rule_kind")]
    pub rule_kind: RuleKind,

    /// Kotlin module name
    #[arg(long = "kotlin_module_name", value_parser = parse_module_name)]
    pub module_name: String,

    /// Compile classpath
    #[arg(long = "classpath", num_args = 1..)]
    pub classpath: Vec<String>,

    /// Declared direct dependency jars
    #[arg(long = "direct_dependencies", num_args = 1..)]
    pub direct_dependencies: Vec<String>,

    #[arg(long = "kotlin_sources", num_args = 1..)]
    pub kotlin_sources: Vec<String>,

    #[arg(long = "java_sources", num_args = 1..)]
    pub java_sources: Vec<String>,

    /// Class output (directory or jar)
    #[arg(long = "output")]
    pub output: String,

    /// Where to write the dependency report
    #[arg(long = "kotlin_output_jdeps")]
    pub output_jdeps: Option<String>,

    #[arg(long = "strict_kotlin_deps", default_value_t = DepsPolicy::Off)]
    pub strict_kotlin_deps: DepsPolicy,

    /// Debug tags: `timings`, `trace`
    #[arg(long = "kotlin_debug_tags", num_args = 1..)]
    pub debug_tags: Vec<String>,

    /// Extra compiler flags, one per occurrence
    #[arg(long = "kotlin_passthrough_flags", allow_hyphen_values = true)]
    pub passthrough_flags: Vec<String>,

    #[arg(long = "kotlin_api_version")]
    pub api_version: Option<String>,

    #[arg(long = "kotlin_language_version")]
    pub language_version: Option<String>,

    #[arg(long = "kotlin_jvm_target")]
    pub jvm_target: Option<String>,

    /// Output directories whose internals are visible to this module
    #[arg(long = "kotlin_friend_paths", num_args = 1..)]
    pub friend_paths: Vec<String>,

    /// Whether Kotlin sources are compiled at all
    #[arg(long = "build_kotlin", default_value_t = true, action = ArgAction::Set)]
    pub build_kotlin: bool,
}

impl BuildOptions {
    pub fn parse_args(args: &[String]) -> Result<Self, WorkError> {
        Self::try_parse_from(args).map_err(|e| WorkError::Argument(e.to_string()))
    }

    /// All sources handed to the compiler.
    pub fn sources(&self) -> impl Iterator<Item = &String> {
        self.kotlin_sources.iter().chain(&self.java_sources)
    }

    /// Whether the compiler has anything to do.
    pub fn has_sources(&self) -> bool {
        self.build_kotlin && !self.kotlin_sources.is_empty()
    }

    /// Compiler arguments for these options.
    pub fn compiler_args(&self) -> Vec<String> {
        let mut args = vec!["-module-name".to_string(), self.module_name.clone()];

        if let Some(target) = &self.jvm_target {
            args.extend(["-jvm-target".to_string(), target.clone()]);
        }
        if let Some(version) = &self.api_version {
            args.extend(["-api-version".to_string(), version.clone()]);
        }
        if let Some(version) = &self.language_version {
            args.extend(["-language-version".to_string(), version.clone()]);
        }
        if !self.classpath.is_empty() {
            let separator = if cfg!(windows) { ";" } else { ":" };
            args.extend(["-cp".to_string(), self.classpath.join(separator)]);
        }
        if !self.friend_paths.is_empty() {
            args.push(format!("-Xfriend-paths={}", self.friend_paths.join(",")));
        }

        args.extend(["-d".to_string(), self.output.clone()]);
        args.extend(self.passthrough_flags.iter().cloned());
        args.extend(self.sources().cloned());
        args
    }

    /// One `name: value` line per option, for the `trace` debug tag.
    pub fn summary_lines(&self) -> Vec<String> {
        let list = |values: &[String]| values.join(", ");
        vec![
            format!("target_label: {}", self.target_label),
            format!("rule_kind: {}", self.rule_kind),
            format!("module_name: {}", self.module_name),
            format!("classpath: {}", list(&self.classpath)),
            format!("direct_dependencies: {}", list(&self.direct_dependencies)),
            format!("kotlin_sources: {}", list(&self.kotlin_sources)),
            format!("java_sources: {}", list(&self.java_sources)),
            format!("output: {}", self.output),
            format!("output_jdeps: {}", self.output_jdeps.as_deref().unwrap_or("")),
            format!("strict_kotlin_deps: {}", self.strict_kotlin_deps),
            format!("passthrough_flags: {}", list(&self.passthrough_flags)),
        ]
    }
}

/// Options of a jdeps merge task.
#[derive(Parser, Debug, Clone)]
#[command(name = "merge-jdeps", no_binary_name = true, disable_help_flag = true)]
pub struct MergeOptions {
    /// Dependency reports to merge
    #[arg(long = "inputs", num_args = 1.., required = true)]
    pub inputs: Vec<String>,

    /// Merged report
    #[arg(long = "output")]
    pub output: String,

    #[arg(long = "target_label")]
    pub target_label: String,

    #[arg(long = "report_unused_deps")]
    pub report_unused_deps: DepsPolicy,
}

impl MergeOptions {
    pub fn parse_args(args: &[String]) -> Result<Self, WorkError> {
        Self::try_parse_from(args).map_err(|e| WorkError::Argument(e.to_string()))
    }
}
