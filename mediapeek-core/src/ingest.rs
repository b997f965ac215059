use mediapeek_model::FetchResult;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::{
    AnalysisOptions, MediaAnalysis, MetadataEngine, analyze_media_buffer,
};
use crate::archive::{detect_container, extract_first_filename};
use crate::error::Result;
use crate::fetch::{FetchOptions, HttpTransport, fetch_prefix};
use crate::filename::is_valid_filename;

/// Where the reported filename came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameSource {
    /// `Content-Disposition` header, or the URL when there was none.
    Declared,
    /// First regular entry of the archive the URL points at.
    Archive,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub fetch: FetchResult,
    pub filename: String,
    pub filename_source: FilenameSource,
}

/// Fetches a prefix and settles on the filename to present for it.
#[derive(Clone)]
pub struct Ingestor {
    transport: Arc<dyn HttpTransport>,
    fetch: FetchOptions,
    analysis: AnalysisOptions,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("fetch", &self.fetch)
            .field("analysis", &self.analysis)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    pub fn new(transport: Arc<dyn HttpTransport>, fetch: FetchOptions) -> Self {
        Self {
            transport,
            fetch,
            analysis: AnalysisOptions::default(),
        }
    }

    pub fn with_analysis_options(mut self, analysis: AnalysisOptions) -> Self {
        self.analysis = analysis;
        self
    }

    pub async fn ingest(&self, url: &str) -> Result<IngestOutcome> {
        let fetch = fetch_prefix(self.transport.as_ref(), url, &self.fetch).await?;
        let (filename, filename_source) = resolve_filename(&fetch);
        info!(%filename, source = ?filename_source, "ingested media prefix");
        Ok(IngestOutcome {
            fetch,
            filename,
            filename_source,
        })
    }

    /// Ingest `url` and run `engine` over the fetched prefix.
    pub async fn analyze<E, S>(
        &self,
        engine: &mut E,
        url: &str,
        formats: &[S],
    ) -> Result<(IngestOutcome, MediaAnalysis)>
    where
        E: MetadataEngine + ?Sized,
        S: AsRef<str>,
    {
        let outcome = self.ingest(url).await?;
        let analysis = analyze_media_buffer(
            engine,
            &outcome.fetch.bytes,
            Some(outcome.fetch.total_size),
            &outcome.filename,
            formats,
            &self.analysis,
        )
        .await;
        Ok((outcome, analysis))
    }
}

/// Prefer the first archive entry's name when it looks like a real filename.
pub fn resolve_filename(fetch: &FetchResult) -> (String, FilenameSource) {
    let declared = || (fetch.declared_filename.clone(), FilenameSource::Declared);

    if !detect_container(&fetch.bytes).is_archive() {
        return declared();
    }

    match extract_first_filename(&fetch.bytes) {
        Some(name) if is_valid_filename(&name) => {
            debug!(archive_entry = %name, "using filename from archive");
            (name, FilenameSource::Archive)
        }
        Some(name) => {
            debug!(archive_entry = ?name, "archive entry name rejected");
            declared()
        }
        None => declared(),
    }
}
