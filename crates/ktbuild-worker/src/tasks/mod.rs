//! Build actions served by the worker binaries.

mod build;
mod merge;

pub use build::KotlinBuilder;
pub use merge::MergeJdeps;
