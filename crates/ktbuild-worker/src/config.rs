//! Worker configuration.

use std::env;
use std::path::PathBuf;

use crate::logging::Granularity;

/// Environment variable naming the compiler launcher.
pub const KOTLINC_ENV: &str = "KTBUILD_KOTLINC";

/// Environment variable enabling debug records for every task.
pub const VERBOSE_ENV: &str = "KTBUILD_VERBOSE";

/// Worker configuration, loaded once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Compiler launcher executable.
    pub kotlinc: PathBuf,

    /// Record debug output in every task scope.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kotlinc: PathBuf::from("kotlinc"),
            verbose: false,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            kotlinc: lookup(KOTLINC_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.kotlinc),
            verbose: lookup(VERBOSE_ENV)
                .map(|v| !matches!(v.trim(), "" | "0" | "false"))
                .unwrap_or(defaults.verbose),
        }
    }

    /// Default scope granularity of tasks.
    pub fn granularity(&self) -> Granularity {
        if self.verbose {
            Granularity::Debug
        } else {
            Granularity::Info
        }
    }
}
