use once_cell::sync::Lazy;
use regex::Regex;

static LFE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bLFE\d*\b").expect("LFE regex should compile"));

static HEIGHT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(TFL|TFR|TBL|TBR|TSL|TSR|THL|THR|TFC|TBC|VHL|VHR|TC|TCS)\b",
    )
    .expect("height channel regex should compile")
});

/// Channel layout in `main.lfe[.height]` form, e.g. `"5.1"` or `"7.1.4"`.
///
/// `count` is the raw channel count as reported by the engine (a number or a
/// numeric string). Returns `None` when it is missing, non-numeric or zero.
pub fn channel_layout(count: &str, positions: &str) -> Option<String> {
    let count = parse_count(count)?;
    let positions = positions.to_uppercase();

    let lfe = LFE_REGEX.find_iter(&positions).count() as i64;
    let height = HEIGHT_REGEX.find_iter(&positions).count() as i64;
    let main = count - lfe - height;

    Some(if height > 0 {
        format!("{main}.{lfe}.{height}")
    } else {
        format!("{main}.{lfe}")
    })
}

/// Display label for a channel configuration.
///
/// Mono and stereo get names; everything else reads `"<layout> channel"`.
/// An unusable count yields an empty string.
pub fn format_channels(count: &str, positions: &str) -> String {
    match channel_layout(count, positions).as_deref() {
        None => String::new(),
        Some("1.0") => "Mono".to_string(),
        Some("2.0") => "Stereo".to_string(),
        Some(layout) => format!("{layout} channel"),
    }
}

fn parse_count(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let count = value.trunc() as i64;
    (count != 0).then_some(count)
}
