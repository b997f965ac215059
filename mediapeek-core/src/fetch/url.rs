use url::Url;

use crate::error::FetchError;

const GOOGLE_DRIVE_HOSTS: &[&str] = &["drive.google.com", "docs.google.com"];
const GOOGLE_DRIVE_DOWNLOAD: &str = "https://drive.google.com/uc";

/// File hosts whose share links need rewriting before they serve bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownHost {
    GoogleDrive,
    Dropbox,
}

impl KnownHost {
    /// An HTML answer from these hosts is a quota wall rather than a page.
    pub fn html_means_rate_limited(self) -> bool {
        matches!(self, KnownHost::GoogleDrive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: Url,
    pub host: Option<KnownHost>,
}

impl ResolvedUrl {
    pub fn is_google_drive(&self) -> bool {
        self.host == Some(KnownHost::GoogleDrive)
    }
}

/// Parse `raw` and accept only absolute `http`/`https` URLs with a host.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| FetchError::InvalidUrl(format!("{raw}: {err}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "unsupported scheme `{}`",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(FetchError::InvalidUrl(format!("{raw}: missing host")));
    }

    Ok(url)
}

/// Rewrite share links of known hosts into direct-download links.
pub fn resolve_download_url(url: Url) -> ResolvedUrl {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    if GOOGLE_DRIVE_HOSTS.contains(&host.as_str()) {
        let direct = google_drive_file_id(&url).and_then(|id| {
            Url::parse_with_params(
                GOOGLE_DRIVE_DOWNLOAD,
                &[("export", "download"), ("id", id.as_str())],
            )
            .ok()
        });
        return ResolvedUrl {
            url: direct.unwrap_or(url),
            host: Some(KnownHost::GoogleDrive),
        };
    }

    if host == "dropbox.com" || host.ends_with(".dropbox.com") {
        return ResolvedUrl {
            url: force_dropbox_download(url),
            host: Some(KnownHost::Dropbox),
        };
    }

    ResolvedUrl { url, host: None }
}

/// `/file/d/<id>/view`, `/open?id=<id>` and `/uc?id=<id>` all carry the id.
fn google_drive_file_id(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    if let Some(pos) = segments.windows(2).position(|pair| pair == ["file", "d"])
        && let Some(id) = segments.get(pos + 2).filter(|id| !id.is_empty())
    {
        return Some(id.to_string());
    }

    url.query_pairs()
        .find(|(key, value)| key == "id" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn force_dropbox_download(mut url: Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "dl" && value == "0" {
                "1".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    if !pairs.is_empty() {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}
