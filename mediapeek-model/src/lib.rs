//! Core data model definitions shared across mediapeek crates.
#![allow(missing_docs)]

pub mod fetch;
pub mod format;
pub mod report;
pub mod track;

// Intentionally curated re-exports for downstream consumers.
pub use fetch::{DEFAULT_MAX_BYTES, FetchResult};
pub use format::ReportFormat;
pub use report::MediaReport;
pub use track::{MediaTrack, TrackKind};
