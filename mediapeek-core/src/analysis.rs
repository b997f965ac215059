//! Drive an external metadata engine over an in-memory prefix.
//!
//! The engine only sees a size oracle and a chunk reader backed by bytes that
//! were already fetched; nothing is re-downloaded. Each requested view is
//! generated in turn and failures are recorded per view instead of aborting
//! the whole analysis.

use async_trait::async_trait;
use mediapeek_model::{MediaReport, ReportFormat};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::EngineError;

pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

const COMPLETE_NAME_LABEL: &str = "Complete name";
const TEXT_KEY_WIDTH: usize = 41;
const FILENAME_FIELDS: [&str; 3] = ["CompleteName", "Complete_name", "File_Name"];

/// Random-access view of the bytes an engine may read.
pub trait ByteSource: Send + Sync {
    /// Size of the whole remote resource, which may exceed what is buffered.
    fn size(&self) -> u64;

    /// Up to `size` bytes starting at `offset`; empty past the buffered end.
    fn read_chunk(&self, size: usize, offset: u64) -> &[u8];
}

/// A fetched prefix standing in for the full resource.
#[derive(Debug, Clone, Copy)]
pub struct PrefixSource<'a> {
    bytes: &'a [u8],
    declared_size: u64,
}

impl<'a> PrefixSource<'a> {
    /// `declared_size` falls back to the buffer length when unknown.
    pub fn new(bytes: &'a [u8], declared_size: Option<u64>) -> Self {
        Self {
            bytes,
            declared_size: declared_size.unwrap_or(bytes.len() as u64),
        }
    }
}

impl ByteSource for PrefixSource<'_> {
    fn size(&self) -> u64 {
        self.declared_size
    }

    fn read_chunk(&self, size: usize, offset: u64) -> &[u8] {
        let Ok(start) = usize::try_from(offset) else {
            return &[];
        };
        if start >= self.bytes.len() {
            return &[];
        }
        let end = start.saturating_add(size).min(self.bytes.len());
        &self.bytes[start..end]
    }
}

/// Settings passed to the engine for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub format: ReportFormat,
    /// Include internal fields in the output.
    pub full: bool,
    pub chunk_size: usize,
    pub cover_data: bool,
}

/// What an engine produced for one view.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Object(MediaReport),
    Rendered(String),
}

#[async_trait]
pub trait MetadataEngine: Send {
    async fn analyze(
        &mut self,
        source: &dyn ByteSource,
        options: &EngineOptions,
    ) -> Result<EngineOutput, EngineError>;

    /// Release engine resources once every view has been generated.
    fn close(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub chunk_size: usize,
    pub cover_data: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cover_data: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisDiagnostics {
    pub format_generation_ms: BTreeMap<String, u64>,
    pub total_analysis_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_process_error: Option<String>,
    pub format_errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaAnalysis {
    /// Generated views keyed by `json`, `text`, `xml` or `html`.
    pub results: BTreeMap<String, String>,
    pub diagnostics: AnalysisDiagnostics,
}

/// Formats named by `requested`; empty or `all` selects every format and an
/// unmatched request falls back to JSON.
pub fn select_formats<S: AsRef<str>>(requested: &[S]) -> Vec<ReportFormat> {
    let everything = requested.is_empty()
        || requested
            .iter()
            .any(|format| format.as_ref().trim().eq_ignore_ascii_case("all"));

    let selected: Vec<ReportFormat> = ReportFormat::ALL
        .into_iter()
        .filter(|format| {
            everything
                || requested.iter().any(|wanted| format.matches(wanted.as_ref()))
        })
        .collect();

    if selected.is_empty() {
        vec![ReportFormat::Object]
    } else {
        selected
    }
}

/// Run `engine` once per requested view over `bytes`.
pub async fn analyze_media_buffer<E, S>(
    engine: &mut E,
    bytes: &[u8],
    file_size: Option<u64>,
    filename: &str,
    requested: &[S],
    options: &AnalysisOptions,
) -> MediaAnalysis
where
    E: MetadataEngine + ?Sized,
    S: AsRef<str>,
{
    let started = Instant::now();
    let source = PrefixSource::new(bytes, file_size);
    let mut analysis = MediaAnalysis::default();

    for format in select_formats(requested) {
        let key = format.result_key().to_string();
        let format_started = Instant::now();
        let engine_options = EngineOptions {
            format,
            full: matches!(format, ReportFormat::Object | ReportFormat::Text),
            chunk_size: options.chunk_size,
            cover_data: options.cover_data,
        };

        debug!(%format, "generating view");
        match engine.analyze(&source, &engine_options).await {
            Ok(output) => {
                match render_view(format, output, filename) {
                    Ok(rendered) => {
                        analysis.results.insert(key.clone(), rendered);
                    }
                    Err(ViewError::Object(message)) => {
                        warn!(error = %message, "failed to process object view");
                        analysis.diagnostics.object_process_error = Some(message);
                        analysis.results.insert(key.clone(), "{}".to_string());
                    }
                    Err(ViewError::Format(message)) => {
                        record_format_error(&mut analysis, format, message);
                        continue;
                    }
                }
                analysis.diagnostics.format_generation_ms.insert(
                    key,
                    format_started.elapsed().as_millis() as u64,
                );
            }
            Err(err) => record_format_error(&mut analysis, format, err.to_string()),
        }
    }

    engine.close();
    analysis.diagnostics.total_analysis_ms =
        started.elapsed().as_millis() as u64;
    info!(
        views = analysis.results.len(),
        failed = analysis.diagnostics.format_errors.len(),
        elapsed_ms = analysis.diagnostics.total_analysis_ms,
        "analysis finished"
    );
    analysis
}

#[derive(Debug)]
enum ViewError {
    Object(String),
    Format(String),
}

fn record_format_error(
    analysis: &mut MediaAnalysis,
    format: ReportFormat,
    message: String,
) {
    warn!(%format, error = %message, "view generation failed");
    let key = format.result_key().to_string();
    analysis.diagnostics.format_errors.insert(key.clone(), message);
    analysis
        .results
        .insert(key, format!("Error generating {} view.", format.type_name()));
}

fn render_view(
    format: ReportFormat,
    output: EngineOutput,
    filename: &str,
) -> Result<String, ViewError> {
    match (format, output) {
        (ReportFormat::Object, EngineOutput::Object(report)) => {
            object_view(report.into_value(), filename)
        }
        (ReportFormat::Object, EngineOutput::Rendered(raw)) => {
            let value = serde_json::from_str(&raw)
                .map_err(|err| ViewError::Object(err.to_string()))?;
            object_view(value, filename)
        }
        (ReportFormat::Text, EngineOutput::Rendered(text)) => {
            Ok(inject_complete_name(&text, filename))
        }
        (ReportFormat::Text, EngineOutput::Object(report)) => Ok(
            inject_complete_name(&crate::report::render_text(&report), filename),
        ),
        (_, EngineOutput::Rendered(raw)) => Ok(raw),
        (format, EngineOutput::Object(_)) => Err(ViewError::Format(format!(
            "engine returned structured output for the {format} view"
        ))),
    }
}

fn object_view(value: Value, filename: &str) -> Result<String, ViewError> {
    let mut report = MediaReport::new(value);
    if let Some(general) = report.general_mut() {
        let named = FILENAME_FIELDS
            .iter()
            .any(|field| general.get(*field).is_some_and(is_truthy));
        if !named {
            general.insert(
                "CompleteName".to_string(),
                Value::String(filename.to_string()),
            );
        }
    }
    serde_json::to_string_pretty(report.as_value())
        .map_err(|err| ViewError::Object(err.to_string()))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Add a `Complete name` line to a text report that lacks one.
///
/// The line goes after the General section's `Unique ID` line, or directly
/// under the `General` heading when there is none.
pub fn inject_complete_name(text: &str, filename: &str) -> String {
    if text.contains(COMPLETE_NAME_LABEL) {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.split('\n').collect();
    let Some(general) = lines
        .iter()
        .position(|line| line.trim().starts_with("General"))
    else {
        return text.to_string();
    };

    let mut insert_at = general + 1;
    for (index, line) in lines.iter().enumerate().skip(general + 1) {
        let line = line.trim();
        if line.starts_with("Unique ID") {
            insert_at = index + 1;
            break;
        }
        if line.is_empty() {
            break;
        }
    }

    let entry = format!("{COMPLETE_NAME_LABEL:<TEXT_KEY_WIDTH$}: {filename}");
    lines.insert(insert_at, &entry);
    lines.join("\n")
}
