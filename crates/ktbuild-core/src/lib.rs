//! ktbuild Core Domain Types
//!
//! This crate contains pure dependency-report logic with no dependencies on:
//! - The worker wire protocol
//! - Archive or filesystem access
//! - Runtime specifics
//!
//! Classification, merging and strict-deps checks all operate on in-memory
//! reports. Resolving an archive to its owning build label is delegated to a
//! [`LabelResolver`] supplied by the caller.

pub mod classify;
pub mod dependency;
pub mod error;
pub mod merge;
pub mod policy;
pub mod resolver;
pub mod strict_deps;

// Re-export commonly used types
pub use classify::{archive_of, classify, ARCHIVE_EXTENSION, ARCHIVE_SEPARATOR};
pub use dependency::{DependencyKind, DependencyRecord, DependencyReport};
pub use error::CoreError;
pub use merge::{find_unused_labels, merge_reports, UnusedDeps};
pub use policy::DepsPolicy;
pub use resolver::{normalize_label, JarOwner, LabelResolver};
pub use strict_deps::{check_strict_deps, StrictDepsViolation};
