use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static EXTENDED_FILENAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)filename\*=UTF-8''([^;]+)")
        .expect("extended filename regex should compile")
});

static PLAIN_FILENAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename="?([^";]+)"?"#)
        .expect("filename regex should compile")
});

/// Filename declared by a `Content-Disposition` header.
///
/// The RFC 5987 `filename*=UTF-8''...` form wins over `filename="..."`.
/// When the extended form is present but cannot be decoded the legacy form
/// is not consulted and `None` is returned.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(encoded) = EXTENDED_FILENAME_REGEX
        .captures(header)
        .and_then(|caps| caps.get(1))
    {
        return match urlencoding::decode(encoded.as_str().trim()) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(err) => {
                warn!(error = %err, "failed to decode filename* parameter");
                None
            }
        };
    }

    PLAIN_FILENAME_REGEX
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}
