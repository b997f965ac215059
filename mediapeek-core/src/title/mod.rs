//! Turn verbose track titles into short display labels.
//!
//! Titles such as `"English DTS-HD MA 5.1 @ 4337 kbps"` mostly repeat what
//! the structured track fields already say. The normalizer strips the
//! language, codec, bitrate and layout tokens and keeps whatever is left
//! (`"Commentary"`, `"(SDH)"`, ...). Anything too short to be meaningful
//! comes back as `None`.

pub mod rules;

use mediapeek_model::MediaTrack;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use self::rules::{
    COMMON_AUDIO_TERMS, COMMON_SUBTITLE_TERMS, CodecIdentity, METADATA_FIELDS,
    rule_tokens,
};

const WRAPPER_PASS_LIMIT: usize = 32;
const MIN_KEYWORD_CHARS: usize = 2;
const MIN_TITLE_CHARS: usize = 2;

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr, $what:literal) => {
        static $name: Lazy<Regex> = Lazy::new(|| {
            Regex::new($pattern).expect(concat!($what, " regex should compile"))
        });
    };
}

lazy_regex!(FORCED, r"(?i)(\[|\()?\s*\bForced\b\s*(\]|\))?", "forced");
lazy_regex!(SURROUND, r"(?i)\b(Surround\s+\d+(\.\d+)?|Stereo)\b", "surround");
lazy_regex!(DTS_HD_RESIDUE, r"(?i)\bDTS:HD\b", "DTS:HD");
lazy_regex!(HD_SUFFIX, r"(?i):HD\b", "HD suffix");
lazy_regex!(
    BITRATE,
    r"(?i)(@\s*)?\b\d+(\.\d+)?\s*(kb/s|kbps|mb/s|mbps)\b",
    "bitrate"
);
lazy_regex!(ORPHAN_AT, r"\s+@\s+", "orphan @");
lazy_regex!(TRAILING_AT, r"\s+@$", "trailing @");
lazy_regex!(
    CHANNEL_COUNT,
    r"(?i)\b\d+(\.\d+)?\s*(-)?\s*(ch|channel|channels|track|mix)\b",
    "channel count"
);
lazy_regex!(BARE_LAYOUT, r"\b\d+\.\d+\b", "layout");
lazy_regex!(SAMPLE_RATE, r"(?i)\b\d+(\.\d+)?\s*kHz\b", "sample rate");
lazy_regex!(EMPTY_SQUARE, r"\[\s*\]", "empty bracket");
lazy_regex!(EMPTY_PAREN, r"\(\s*\)", "empty paren");
lazy_regex!(EMPTY_BRACE, r"\{\s*\}", "empty brace");
lazy_regex!(SEPARATOR_SQUARE, r"\[\s*[-|]\s*\]", "separator bracket");
lazy_regex!(SEPARATOR_PAREN, r"\(\s*[-|]\s*\)", "separator paren");
lazy_regex!(CONNECTOR_WITH, r"(?i)\bwith\b", "with");
lazy_regex!(CONNECTOR_AT, r"(?i)\bat\b", "at");
lazy_regex!(SPACED_DASH, r"\s+-\s+", "spaced dash");
lazy_regex!(WHITESPACE, r"\s+", "whitespace");
lazy_regex!(LEADING_SEPARATORS, r"^[\s,.\-;:@]+", "leading separator");
lazy_regex!(TRAILING_SEPARATORS, r"[\s,.\-;:@]+$", "trailing separator");

/// Which stream a title belongs to; selects the keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    Audio,
    Subtitle,
}

/// Normalize `raw` for display. `language` is the track's human-readable
/// language label, e.g. `"English (US)"`.
pub fn clean_title(
    raw: &str,
    track: &MediaTrack,
    language: Option<&str>,
    kind: TitleKind,
) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let mut title = match language {
        Some(language) if !language.is_empty() => strip_language(raw, language),
        _ => raw.to_string(),
    };

    let keywords = collect_keywords(track, kind);
    title = remove_keywords(&title, &keywords);

    if kind == TitleKind::Audio {
        let dts_removed = keywords.iter().any(|keyword| keyword == "DTS");
        title = strip_audio_specs(&title, dts_removed);
    }

    title = settle(&title);

    if kind == TitleKind::Audio && title.eq_ignore_ascii_case("mix") {
        trace!(raw, "audio title reduced to a bare mix label");
        return None;
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return None;
    }
    Some(title)
}

pub fn clean_audio_title(
    raw: &str,
    track: &MediaTrack,
    language: Option<&str>,
) -> Option<String> {
    clean_title(raw, track, language, TitleKind::Audio)
}

pub fn clean_subtitle_title(
    raw: &str,
    track: &MediaTrack,
    language: Option<&str>,
) -> Option<String> {
    clean_title(raw, track, language, TitleKind::Subtitle)
}

/// Remove the language label (and its bare form before any parenthetical)
/// plus "Forced" markers, which a badge already conveys.
pub fn strip_language(title: &str, language: &str) -> String {
    let mut names = vec![language.to_string()];
    if let Some((bare, _)) = language.split_once('(') {
        let bare = bare.trim();
        if !bare.is_empty() {
            names.push(bare.to_string());
        }
    }

    let without_language = remove_keywords(title, &names);
    FORCED.replace_all(&without_language, "").trim().to_string()
}

fn collect_keywords(track: &MediaTrack, kind: TitleKind) -> Vec<String> {
    let common = match kind {
        TitleKind::Audio => COMMON_AUDIO_TERMS,
        TitleKind::Subtitle => COMMON_SUBTITLE_TERMS,
    };
    let mut keywords: Vec<String> =
        common.iter().map(|term| term.to_string()).collect();

    for field in METADATA_FIELDS {
        match (track.get(field), kind) {
            (Some(Value::String(value)), _) => keywords.push(value.clone()),
            (Some(Value::Number(value)), TitleKind::Audio) => {
                keywords.push(value.to_string())
            }
            _ => {}
        }
    }

    if kind == TitleKind::Audio {
        let identity = CodecIdentity::new(
            track.str_field("Format").unwrap_or_default(),
            track.str_field("Format_Commercial").unwrap_or_default(),
            track.str_field("CodecID").unwrap_or_default(),
        );
        keywords.extend(rule_tokens(&identity).map(str::to_string));
    }

    keywords
}

/// Case-insensitive removal of whole-word keywords, longest first.
///
/// Keywords shorter than two characters are ignored. A word boundary is only
/// demanded on an edge whose character is itself part of a word, so tokens
/// like `"DD+"` or `"English (US)"` still match.
pub fn remove_keywords<S: AsRef<str>>(text: &str, keywords: &[S]) -> String {
    let mut sorted: Vec<&str> = keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|word| {
            word.chars().count() >= MIN_KEYWORD_CHARS && !word.trim().is_empty()
        })
        .collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let mut processed = text.to_string();
    for word in sorted {
        let Ok(pattern) = Regex::new(&keyword_pattern(word)) else {
            continue;
        };
        processed = pattern.replace_all(&processed, "").into_owned();
    }
    processed
}

fn keyword_pattern(word: &str) -> String {
    let boundary = |ch: Option<char>| {
        if ch.is_some_and(is_word_char) { r"\b" } else { "" }
    };
    format!(
        "(?i){}{}{}",
        boundary(word.chars().next()),
        regex::escape(word),
        boundary(word.chars().last())
    )
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn strip_audio_specs(text: &str, dts_removed: bool) -> String {
    let mut processed = SURROUND.replace_all(text, "").into_owned();

    if dts_removed {
        processed = DTS_HD_RESIDUE.replace_all(&processed, "").into_owned();
        processed = HD_SUFFIX.replace_all(&processed, "").into_owned();
    }

    processed = BITRATE.replace_all(&processed, "").into_owned();
    processed = ORPHAN_AT.replace_all(&processed, " ").into_owned();
    processed = TRAILING_AT.replace_all(&processed, "").into_owned();

    processed = CHANNEL_COUNT.replace_all(&processed, "").into_owned();
    processed = BARE_LAYOUT.replace_all(&processed, "").into_owned();

    SAMPLE_RATE.replace_all(&processed, "").into_owned()
}

/// Strip empty or separator-only bracket pairs until nothing changes.
fn clean_wrappers(text: &str) -> String {
    let mut current = text.to_string();

    for _ in 0..WRAPPER_PASS_LIMIT {
        let mut next = current.clone();
        for pattern in [
            &*EMPTY_SQUARE,
            &*EMPTY_PAREN,
            &*EMPTY_BRACE,
            &*SEPARATOR_SQUARE,
            &*SEPARATOR_PAREN,
        ] {
            next = pattern.replace_all(&next, "").into_owned();
        }
        let next = next.trim().to_string();

        if next == current {
            break;
        }
        current = next;
    }

    current
}

/// Alternate wrapper cleanup and polish until neither changes the text.
///
/// Dropping a connector can empty a bracket pair that the wrapper pass has
/// already looked at, so a single round is not enough.
fn settle(text: &str) -> String {
    let mut current = text.to_string();

    for _ in 0..WRAPPER_PASS_LIMIT {
        let next = polish(&clean_wrappers(&current));
        if next == current {
            break;
        }
        current = next;
    }

    current
}

fn polish(text: &str) -> String {
    let processed = CONNECTOR_WITH.replace_all(text, "");
    let processed = CONNECTOR_AT.replace_all(&processed, "");
    let processed = SPACED_DASH.replace_all(&processed, " ");
    let processed = WHITESPACE.replace_all(&processed, " ");
    let processed = LEADING_SEPARATORS.replace(processed.trim(), "");
    TRAILING_SEPARATORS.replace(&processed, "").into_owned()
}
