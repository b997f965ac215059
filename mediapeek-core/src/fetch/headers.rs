use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, RANGE,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::fmt;
use tracing::warn;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("priority", "u=0, i"),
    (
        "sec-ch-ua",
        r#""Google Chrome";v="143", "Chromium";v="143", "Not A(Brand";v="24""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""macOS""#),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
];

/// Inclusive byte range, as sent in a `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// The first `len` bytes of a resource; `None` for an empty prefix.
    pub fn prefix(len: u64) -> Option<Self> {
        len.checked_sub(1).map(|end| Self { start: 0, end })
    }

    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes={}-{}", self.start, self.end)
    }
}

/// Headers of a desktop Chrome navigation, so hosts that gate on the
/// client treat the request like a browser download.
pub fn emulation_headers(user_agent: &str, range: Option<ByteRange>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let agent = HeaderValue::from_str(user_agent).unwrap_or_else(|_| {
        warn!(user_agent, "invalid user agent, using the default");
        HeaderValue::from_static(DEFAULT_USER_AGENT)
    });
    headers.insert(USER_AGENT, agent);

    if let Some(range) = range
        && let Ok(value) = HeaderValue::from_str(&range.to_string())
    {
        headers.insert(RANGE, value);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_range() {
        assert_eq!(ByteRange::prefix(0), None);
        let range = ByteRange::prefix(1024).expect("non-empty");
        assert_eq!(range.to_string(), "bytes=0-1023");
        assert_eq!(range.byte_count(), 1024);
    }

    #[test]
    fn test_emulation_headers() {
        let headers =
            emulation_headers(DEFAULT_USER_AGENT, ByteRange::prefix(10));
        assert_eq!(headers.get(RANGE).and_then(|v| v.to_str().ok()), Some("bytes=0-9"));
        assert_eq!(
            headers.get("sec-ch-ua-platform").and_then(|v| v.to_str().ok()),
            Some("\"macOS\"")
        );
        assert!(headers.get(USER_AGENT).is_some());

        let headers = emulation_headers("bad\nagent", None);
        assert!(headers.get(RANGE).is_none());
        assert_eq!(
            headers.get(USER_AGENT).and_then(|v| v.to_str().ok()),
            Some(DEFAULT_USER_AGENT)
        );
    }
}
