//! Protobuf messages and converters for ktbuild.
//!
//! This crate contains:
//! - The persistent worker protocol messages (`WorkRequest`, `WorkResponse`)
//! - The dependency report messages (`Dependencies`, `Dependency`)
//! - Length-delimited framing for the worker protocol
//! - Converters between report messages and domain types
//!
//! The prost code under `src/gen` is regenerated from the files in `proto/`
//! by `build.rs`.

pub mod codec;
pub mod convert;
pub mod error;

/// Generated protobuf types.
pub mod pb {
    /// Persistent worker protocol, package `blaze.worker`.
    pub mod worker {
        include!("gen/blaze.worker.rs");
    }

    /// Dependency reports, package `blaze_deps`.
    pub mod deps {
        include!("gen/blaze_deps.rs");
    }
}

// Re-export commonly used types
pub use codec::{read_delimited, write_delimited};
pub use convert::{decode_report, encode_report};
pub use error::ConvertError;
pub use pb::deps::{Dependencies, Dependency};
pub use pb::worker::{WorkRequest, WorkResponse};
