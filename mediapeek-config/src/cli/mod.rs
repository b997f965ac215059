//! Command implementations behind the `mediapeek` binary.
//!
//! Each command returns the text to print so the binary stays a thin clap
//! front end.

use anyhow::{Context, Result};
use mediapeek_core::report::{render_summary, render_text};
use mediapeek_core::title::{TitleKind, clean_title};
use mediapeek_core::{
    Ingestor, MediaReport, MediaTrack, extract_first_filename, format_channels,
};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::Config;

pub const NO_TITLE: &str = "(no title)";

/// Fetch the prefix of `url` and describe it; `out` receives the raw bytes.
pub async fn fetch(
    config: &Config,
    url: &str,
    out: Option<&Path>,
) -> Result<String> {
    let transport = config
        .fetch
        .transport()
        .context("failed to build HTTP client")?;
    let ingestor =
        Ingestor::new(Arc::new(transport), config.fetch.fetch_options())
            .with_analysis_options(config.analysis.analysis_options());

    let outcome = match ingestor.ingest(url).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_transport() => {
            return Err(
                anyhow::Error::new(err).context(format!("could not reach {url}"))
            );
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(path) = out {
        tokio::fs::write(path, &outcome.fetch.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote prefix");
    }

    let mut summary = String::new();
    writeln!(summary, "Filename:      {}", outcome.filename)?;
    writeln!(summary, "Source:        {:?}", outcome.filename_source)?;
    if outcome.filename != outcome.fetch.declared_filename {
        writeln!(
            summary,
            "Declared as:   {}",
            outcome.fetch.declared_filename
        )?;
    }
    writeln!(summary, "Total size:    {} bytes", outcome.fetch.total_size)?;
    write!(summary, "Buffered:      {} bytes", outcome.fetch.len())?;
    if outcome.fetch.is_complete() {
        summary.push_str(" (complete)");
    }
    Ok(summary)
}

/// First entry name of a local archive, reading at most `max_bytes`.
pub async fn archive_name(
    path: &Path,
    max_bytes: usize,
) -> Result<Option<String>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut prefix = Vec::new();
    file.take(max_bytes as u64)
        .read_to_end(&mut prefix)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(extract_first_filename(&prefix))
}

/// Clean `title`, optionally against the fields of a track stored as JSON.
pub fn clean_title_command(
    kind: TitleKind,
    title: &str,
    language: Option<&str>,
    track: Option<&Path>,
) -> Result<String> {
    let track = match track {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| {
                format!("failed to read {}", path.display())
            })?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| {
                    format!("{} is not valid JSON", path.display())
                })?;
            MediaTrack::from_value(&value)
        }
        None => MediaTrack::new(),
    };

    Ok(clean_title(title, &track, language, kind)
        .unwrap_or_else(|| NO_TITLE.to_string()))
}

pub fn channels(count: &str, positions: &str) -> String {
    format_channels(count, positions)
}

/// Text layout of a JSON report, or one line per audio/subtitle track.
pub fn render(path: &Path, summary: bool) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report: MediaReport = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON report", path.display()))?;

    Ok(if summary {
        render_summary(&report)
    } else {
        render_text(&report)
    })
}
