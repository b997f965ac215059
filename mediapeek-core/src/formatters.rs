use mediapeek_model::MediaTrack;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::channels::format_channels;
use crate::title::{clean_audio_title, clean_subtitle_title};

static DIGIT_GAP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d)\s+(\d)").expect("digit gap regex should compile")
});

const UNKNOWN_LANGUAGE: &str = "Unknown";

pub fn clean_metadata_string(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Join digit groups split by whitespace: `"5 844 kb/s"` becomes `"5844 kb/s"`.
pub fn clean_bitrate_string(value: Option<&str>) -> String {
    let mut current = value.unwrap_or_default().to_string();
    loop {
        let next = DIGIT_GAP_REGEX.replace_all(&current, "$1$2").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Friendly name for a Dolby Vision codec profile string.
pub fn map_dolby_profile(profile: Option<&str>) -> String {
    let Some(profile) = profile else {
        return String::new();
    };
    if profile.contains("dvhe.08") {
        "Profile 8.1".to_string()
    } else if profile.contains("dvhe.05") {
        "Profile 5".to_string()
    } else if profile.contains("dvhe.07") {
        "Profile 7".to_string()
    } else {
        profile.to_string()
    }
}

fn language_label(track: &MediaTrack) -> String {
    non_empty(track, "Language_String")
        .or_else(|| non_empty(track, "Language"))
        .unwrap_or(UNKNOWN_LANGUAGE)
        .to_string()
}

fn non_empty<'a>(track: &'a MediaTrack, field: &str) -> Option<&'a str> {
    track.str_field(field).filter(|value| !value.is_empty())
}

/// Presentation of one subtitle track row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDisplay {
    pub language: String,
    pub title: Option<String>,
    pub show_title: bool,
    pub format: Option<String>,
    pub default: bool,
    pub forced: bool,
}

impl SubtitleDisplay {
    /// `show_original` bypasses the normalizer and shows the raw title.
    pub fn from_track(track: &MediaTrack, show_original: bool) -> Self {
        let language = language_label(track);
        let raw_title = non_empty(track, "Title");
        let forced = track.flag("Forced");

        let title = match raw_title {
            Some(raw) if show_original => Some(raw.to_string()),
            Some(raw) => clean_subtitle_title(raw, track, Some(&language)),
            None => None,
        };

        let forced_label = format!("{language} (Forced)").to_lowercase();
        let redundant_forced = forced
            && raw_title.is_some_and(|raw| raw.to_lowercase() == forced_label);

        let show_title = title.as_deref().is_some_and(|title| {
            !title.is_empty()
                && title.to_lowercase() != language.to_lowercase()
                && !redundant_forced
        });

        Self {
            format: subtitle_format(track),
            language,
            title,
            show_title,
            default: track.flag("Default"),
            forced,
        }
    }
}

fn subtitle_format(track: &MediaTrack) -> Option<String> {
    non_empty(track, "CodecID_Info")
        .or_else(|| non_empty(track, "Format_Info"))
        .or_else(|| non_empty(track, "Format"))
        .or_else(|| non_empty(track, "CodecID"))
        .map(str::to_string)
}

/// Presentation of one audio track row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDisplay {
    pub language: String,
    pub title: Option<String>,
    pub format: Option<String>,
    pub channels: String,
    pub bitrate: String,
    pub default: bool,
}

impl AudioDisplay {
    pub fn from_track(track: &MediaTrack, show_original: bool) -> Self {
        let language = language_label(track);
        let title = non_empty(track, "Title").and_then(|raw| {
            if show_original {
                Some(raw.to_string())
            } else {
                clean_audio_title(raw, track, Some(&language))
            }
        });

        let channels = format_channels(
            &track.text_field("Channels").unwrap_or_default(),
            track.str_field("ChannelPositions").unwrap_or_default(),
        );

        Self {
            format: non_empty(track, "Format_Commercial_IfAny")
                .or_else(|| non_empty(track, "Format"))
                .map(str::to_string),
            channels,
            bitrate: clean_bitrate_string(track.str_field("BitRate_String")),
            default: track.flag("Default"),
            language,
            title,
        }
    }
}
