//! Bounded streaming fetch of a remote resource's leading bytes.
//!
//! A `HEAD` request establishes the size, type and declared filename, then a
//! ranged `GET` streams the prefix into a buffer that never grows past
//! [`FetchOptions::max_bytes`]. Once the buffer is full the body is cancelled.

pub mod disposition;
pub mod headers;
pub mod transport;
pub mod url;

use bytes::Bytes;
use mediapeek_model::{DEFAULT_MAX_BYTES, FetchResult};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{FetchError, Result};

pub use self::disposition::filename_from_disposition;
pub use self::headers::{ByteRange, DEFAULT_USER_AGENT, emulation_headers};
pub use self::transport::{
    GetResponse, HeadResponse, HttpTransport, ReqwestTransport, ResponseBody,
};
pub use self::url::{KnownHost, ResolvedUrl, resolve_download_url, validate_url};

const PROGRESS_LOG_STEP: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Safe limit: the most bytes held in memory for one request.
    pub max_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetch up to `options.max_bytes` leading bytes of `url`.
///
/// Fails when the link points at an HTML page, the server refuses access, or
/// the size is not declared. No retries are attempted.
pub async fn fetch_prefix<T>(
    transport: &T,
    url: &str,
    options: &FetchOptions,
) -> Result<FetchResult>
where
    T: HttpTransport + ?Sized,
{
    let started = Instant::now();
    let resolved = resolve_download_url(validate_url(url)?);
    if resolved.is_google_drive() {
        info!(url = %resolved.url, "converted Google Drive link to direct download");
    }

    debug!(url = %resolved.url, "starting HEAD request");
    let head_started = Instant::now();
    let head = transport
        .head(&resolved.url, emulation_headers(&options.user_agent, None))
        .await?;
    debug!(
        status = head.status,
        elapsed_ms = head_started.elapsed().as_millis() as u64,
        "HEAD request finished"
    );

    if head
        .content_type()
        .is_some_and(|content_type| content_type.contains("text/html"))
    {
        return Err(match resolved.host {
            Some(host) if host.html_means_rate_limited() => {
                FetchError::RateLimited
            }
            _ => FetchError::NotAMediaFile,
        });
    }

    if !head.is_success() {
        return Err(FetchError::from_status(head.status));
    }

    let total_size = head
        .content_length()
        .filter(|size| *size > 0)
        .ok_or(FetchError::SizeUnknown)?;
    debug!(total_size, "remote size");

    let declared_filename = head
        .content_disposition()
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| resolved.url.to_string());
    info!(filename = %declared_filename, "resolved filename");

    let limit = options.max_bytes;
    let Some(range) = ByteRange::prefix(total_size.min(limit as u64)) else {
        warn!("safe limit is zero, skipping body request");
        return Ok(FetchResult {
            bytes: Bytes::new(),
            declared_filename,
            total_size,
        });
    };

    debug!(%range, "requesting prefix");
    let get_started = Instant::now();
    let response = transport
        .get(
            &resolved.url,
            emulation_headers(&options.user_agent, Some(range)),
        )
        .await?;
    debug!(
        status = response.status,
        elapsed_ms = get_started.elapsed().as_millis() as u64,
        "range response headers received"
    );

    if !response.is_success() {
        return Err(FetchError::from_status(response.status));
    }

    let mut buffer = read_prefix(response.body, limit).await?;
    buffer.truncate(usize::try_from(total_size).unwrap_or(usize::MAX));

    info!(
        loaded = buffer.len(),
        total_size,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetch finished"
    );

    Ok(FetchResult {
        bytes: Bytes::from(buffer),
        declared_filename,
        total_size,
    })
}

/// Drain `body` into a buffer of at most `limit` bytes.
///
/// The body is cancelled as soon as the buffer is full. A stream error after
/// some bytes arrived keeps what was read; one before any byte is an error.
async fn read_prefix(
    mut body: Box<dyn ResponseBody>,
    limit: usize,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(limit);
    let mut last_logged = 0usize;

    loop {
        let chunk = match body.next_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) if buffer.is_empty() => return Err(err),
            Err(err) => {
                warn!(
                    error = %err,
                    buffered = buffer.len(),
                    "stream interrupted, keeping the bytes read so far"
                );
                break;
            }
        };

        let space_left = limit - buffer.len();
        let take = chunk.len().min(space_left);
        buffer.extend_from_slice(&chunk[..take]);

        if buffer.len() - last_logged > PROGRESS_LOG_STEP {
            let mib = buffer.len() as f64 / (1024.0 * 1024.0);
            debug!("buffered {mib:.1}MB");
            last_logged = buffer.len();
        }

        if buffer.len() >= limit {
            info!(limit, "hit safe limit, cancelling stream");
            body.cancel().await;
            break;
        }
    }

    Ok(buffer)
}
