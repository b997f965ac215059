//! # Mediapeek Core
//!
//! Inspect remote media without downloading it: fetch a bounded prefix of a
//! URL, recover the real filename from archive headers, and clean up the
//! track titles a metadata engine reports.
//!
//! ## Overview
//!
//! - **Fetching**: [`fetch_prefix`] streams at most a configured number of
//!   leading bytes and cancels the body once the buffer is full
//! - **Archives**: [`extract_first_filename`] reads the first entry name of a
//!   ZIP or TAR prefix
//! - **Titles**: [`clean_audio_title`] and [`clean_subtitle_title`] drop the
//!   language, codec and channel noise from track titles
//! - **Display**: [`format_channels`] and the [`formatters`] helpers turn raw
//!   report fields into labels
//! - **Analysis**: [`analyze_media_buffer`] drives a [`MetadataEngine`] over
//!   the fetched bytes and [`report::render_text`] lays its output out
//!
//! ## Examples
//!
//! ```no_run
//! use mediapeek_core::{FetchOptions, Ingestor, ReqwestTransport};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! async fn peek(url: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::new(
//!         Duration::from_secs(10),
//!         Duration::from_secs(60),
//!     )?;
//!     let ingestor = Ingestor::new(Arc::new(transport), FetchOptions::default());
//!     let outcome = ingestor.ingest(url).await?;
//!     println!("{} ({} bytes)", outcome.filename, outcome.fetch.total_size);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Metadata engine seam and the multi-format analysis driver
pub mod analysis;

/// Container sniffing and first-entry names of ZIP/TAR archives
pub mod archive;

/// Channel count and layout labels
pub mod channels;

/// Error types
pub mod error;

/// Bounded prefix fetching over HTTP
pub mod fetch;

/// Heuristic check for names decoded from binary headers
pub mod filename;

/// Display helpers for audio and subtitle tracks
pub mod formatters;

/// Fetch plus filename resolution
pub mod ingest;

/// Text rendering of structured reports
pub mod report;

/// Track title normalization
pub mod title;

pub use analysis::{
    AnalysisOptions, ByteSource, EngineOptions, EngineOutput, MediaAnalysis,
    MetadataEngine, analyze_media_buffer,
};
pub use archive::{ContainerKind, detect_container, extract_first_filename};
pub use channels::{channel_layout, format_channels};
pub use error::{EngineError, FetchError, Result};
pub use fetch::{FetchOptions, HttpTransport, ReqwestTransport, fetch_prefix};
pub use filename::is_valid_filename;
pub use ingest::{FilenameSource, IngestOutcome, Ingestor};
pub use title::{clean_audio_title, clean_subtitle_title};

pub use mediapeek_model::{
    FetchResult, MediaReport, MediaTrack, ReportFormat, TrackKind,
};
