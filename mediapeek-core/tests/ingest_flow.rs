//! End-to-end ingestion against an in-memory transport.

use async_trait::async_trait;
use bytes::Bytes;
use mediapeek_core::analysis::{ByteSource, EngineOptions, EngineOutput};
use mediapeek_core::fetch::{GetResponse, HeadResponse, ResponseBody};
use mediapeek_core::{
    EngineError, FetchError, FetchOptions, FilenameSource, HttpTransport,
    Ingestor, MediaReport, MetadataEngine, ReportFormat,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

/// Serves one resource, split into fixed-size chunks.
struct StaticResource {
    data: Vec<u8>,
    chunk: usize,
    headers: HeaderMap,
    gets: AtomicUsize,
    cancelled: Arc<AtomicBool>,
    ranges: Mutex<Vec<String>>,
}

impl StaticResource {
    fn new(data: Vec<u8>, chunk: usize, disposition: Option<&'static str>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from(data.len() as u64));
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/octet-stream"),
        );
        if let Some(disposition) = disposition {
            headers.insert(
                "content-disposition",
                HeaderValue::from_static(disposition),
            );
        }
        Self {
            data,
            chunk,
            headers,
            gets: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
            ranges: Mutex::new(Vec::new()),
        }
    }
}

struct ChunkedBody {
    chunks: std::vec::IntoIter<Bytes>,
    cancelled: Arc<AtomicBool>,
}

#[async_trait]
impl ResponseBody for ChunkedBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        assert!(
            !self.cancelled.load(Ordering::SeqCst),
            "body read after cancel"
        );
        Ok(self.chunks.next())
    }

    async fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for StaticResource {
    async fn head(
        &self,
        url: &Url,
        _headers: HeaderMap,
    ) -> Result<HeadResponse, FetchError> {
        Ok(HeadResponse {
            status: 200,
            headers: self.headers.clone(),
            url: url.clone(),
        })
    }

    async fn get(
        &self,
        _url: &Url,
        headers: HeaderMap,
    ) -> Result<GetResponse, FetchError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(range) = headers.get("range").and_then(|v| v.to_str().ok()) {
            self.ranges
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(range.to_string());
        }
        let chunks: Vec<Bytes> = self
            .data
            .chunks(self.chunk)
            .map(Bytes::copy_from_slice)
            .collect();
        Ok(GetResponse {
            status: 206,
            headers: HeaderMap::new(),
            body: Box::new(ChunkedBody {
                chunks: chunks.into_iter(),
                cancelled: self.cancelled.clone(),
            }),
        })
    }
}

fn zip_with_entry(name: &str, padding: usize) -> Vec<u8> {
    let mut data = vec![0u8; 30];
    data[..4].copy_from_slice(&0x0403_4b50u32.to_le_bytes());
    data[26..28].copy_from_slice(&(name.len() as u16).to_le_bytes());
    data.extend_from_slice(name.as_bytes());
    data.resize(data.len() + padding, 0xAB);
    data
}

fn options(max_bytes: usize) -> FetchOptions {
    FetchOptions {
        max_bytes,
        ..FetchOptions::default()
    }
}

#[tokio::test]
async fn archive_entry_replaces_declared_name() {
    let resource = Arc::new(StaticResource::new(
        zip_with_entry("The.Movie.2019.mkv", 4096),
        1000,
        Some("attachment; filename=\"pack.zip\""),
    ));
    let ingestor = Ingestor::new(resource.clone(), options(2048));

    let outcome = ingestor
        .ingest("https://files.example.com/pack.zip")
        .await
        .expect("ingest");

    assert_eq!(outcome.filename, "The.Movie.2019.mkv");
    assert_eq!(outcome.filename_source, FilenameSource::Archive);
    assert_eq!(outcome.fetch.declared_filename, "pack.zip");
    assert_eq!(outcome.fetch.bytes.len(), 2048);
    assert_eq!(outcome.fetch.total_size, 30 + 18 + 4096);
    assert!(resource.cancelled.load(Ordering::SeqCst));
    assert_eq!(
        resource.ranges.lock().expect("ranges").as_slice(),
        ["bytes=0-2047"]
    );
}

#[tokio::test]
async fn media_prefix_keeps_declared_name() {
    let mut data = vec![0x1A, 0x45, 0xDF, 0xA3];
    data.resize(600, 0);
    let resource = Arc::new(StaticResource::new(
        data,
        256,
        Some("inline; filename*=UTF-8''Le%20Film.mkv"),
    ));
    let ingestor = Ingestor::new(resource.clone(), options(10_000));

    let outcome = ingestor
        .ingest("https://cdn.example.com/v/123")
        .await
        .expect("ingest");

    assert_eq!(outcome.filename, "Le Film.mkv");
    assert_eq!(outcome.filename_source, FilenameSource::Declared);
    assert!(outcome.fetch.is_complete());
    assert!(!resource.cancelled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn invalid_url_never_reaches_the_transport() {
    let resource = Arc::new(StaticResource::new(vec![1, 2, 3], 3, None));
    let ingestor = Ingestor::new(resource.clone(), options(10));

    let err = ingestor.ingest("ftp://example.com/file").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
    assert_eq!(resource.gets.load(Ordering::SeqCst), 0);
}

struct CannedEngine {
    closed: bool,
}

#[async_trait]
impl MetadataEngine for CannedEngine {
    async fn analyze(
        &mut self,
        source: &dyn ByteSource,
        options: &EngineOptions,
    ) -> Result<EngineOutput, EngineError> {
        let head = source.read_chunk(4, 0).to_vec();
        match options.format {
            ReportFormat::Object => Ok(EngineOutput::Object(MediaReport::new(json!({
                "media": { "track": [
                    { "@type": "General", "FileSize": source.size().to_string() },
                    { "@type": "Video", "Format": "AVC", "Head": head.len() }
                ]}
            })))),
            ReportFormat::Text => Ok(EngineOutput::Rendered(
                "General\nFormat                                   : Matroska\n"
                    .to_string(),
            )),
            _ => Err(EngineError::Analysis("unsupported view".to_string())),
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[tokio::test]
async fn analysis_runs_over_the_fetched_prefix() {
    let mut data = vec![0x1A, 0x45, 0xDF, 0xA3];
    data.resize(5000, 0);
    let resource = Arc::new(StaticResource::new(
        data,
        1024,
        Some("attachment; filename=movie.mkv"),
    ));
    let ingestor = Ingestor::new(resource, options(2000));
    let mut engine = CannedEngine { closed: false };

    let (outcome, analysis) = ingestor
        .analyze(&mut engine, "https://example.com/movie", &["json", "text", "xml"])
        .await
        .expect("analyze");

    assert!(engine.closed);
    assert_eq!(outcome.fetch.bytes.len(), 2000);

    let object: serde_json::Value =
        serde_json::from_str(&analysis.results["json"]).expect("json view");
    let general = &object["media"]["track"][0];
    assert_eq!(general["FileSize"], "5000");
    assert_eq!(general["CompleteName"], "movie.mkv");

    assert!(analysis.results["text"].contains("Complete name"));
    assert!(analysis.results["text"].contains("movie.mkv"));

    assert_eq!(analysis.results["xml"], "Error generating XML view.");
    assert!(analysis.diagnostics.format_errors.contains_key("xml"));
    assert!(!analysis.results.contains_key("html"));
}
