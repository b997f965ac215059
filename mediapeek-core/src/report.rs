//! Plain-text rendering of a structured report.

use mediapeek_model::{MediaReport, MediaTrack, TrackKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::formatters::{AudioDisplay, SubtitleDisplay};

const COLUMN_WIDTH: usize = 40;

const IGNORED_KEYS: &[&str] = &[
    "@type",
    "@typeorder",
    "extra",
    "Count",
    "StreamOrder",
    "FirstPacketOrder",
    "Inform",
    "StreamKind_String",
    "Simple_Profile",
];

static DISPLAY_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(_String\d*|_Url)$").expect("suffix regex should compile")
});

fn display_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "StreamCount" => "Count of stream of this kind",
        "StreamKind" => "Kind of stream",
        "StreamKindID" => "Stream identifier",
        "VideoCount" => "Count of video streams",
        "AudioCount" => "Count of audio streams",
        "TextCount" => "Count of text streams",
        "MenuCount" => "Count of menu streams",
        "ImageCount" => "Count of image streams",
        "Video_Codec_List" => "Codecs Video",
        "Audio_Codec_List" => "Audio codecs",
        "CompleteName" => "Complete name",
        "FolderName" => "Folder name",
        "FileName" => "File name",
        "FileExtension" => "File extension",
        "Format" => "Format",
        "Format_Extensions" => "Format/Extensions usually used",
        "Format_Commercial" => "Commercial name",
        "Format_Profile" => "Format profile",
        "InternetMediaType" => "Internet media type",
        "CodecID" => "Codec ID",
        "CodecID_Url" => "Codec ID/Url",
        "FileSize" => "File size",
        "Duration" => "Duration",
        "OverallBitRate_Mode" => "Overall bit rate mode",
        "OverallBitRate" => "Overall bit rate",
        "FrameRate" => "Frame rate",
        "FrameCount" => "Frame count",
        "StreamSize" => "Stream size",
        "StreamSize_Proportion" => "Proportion of this stream",
        "Movie" => "Movie name",
        "Encoded_Date" => "Encoded date",
        "Tagged_Date" => "Tagged date",
        "File_Modified_Date" => "File last modification date",
        "File_Modified_Date_Local" => "File last modification date (local)",
        "Encoded_Application" => "Writing application",
        "Format_Info" => "Format/Info",
        "Format_Url" => "Format/Url",
        "Format_Settings" => "Format settings",
        "Format_Settings_CABAC" => "Format settings, CABAC",
        "Format_Settings_RefFrames" => "Format settings, Reference frames",
        "BitRate" => "Bit rate",
        "PixelAspectRatio" => "Pixel aspect ratio",
        "DisplayAspectRatio" => "Display aspect ratio",
        "FrameRate_Mode" => "Frame rate mode",
        "ColorSpace" => "Color space",
        "ChromaSubsampling" => "Chroma subsampling",
        "BitDepth" => "Bit depth",
        "ScanType" => "Scan type",
        "BitsPixel_Frame" => "Bits/(Pixel*Frame)",
        "WritingLibrary" => "Writing library",
        "Encoding_Settings" => "Encoding settings",
        "CodecConfigurationBox" => "Codec configuration box",
        "Channels" => "Channel(s)",
        "ChannelPositions" => "Channel positions",
        "ChannelLayout" => "Channel layout",
        "SamplesPerFrame" => "Samples per frame",
        "SamplingRate" => "Sampling rate",
        "SamplingCount" => "Samples count",
        "Compression_Mode" => "Compression mode",
        "BitRate_Mode" => "Bit rate mode",
        _ => return None,
    };
    Some(name)
}

/// Human label for a report key, e.g. `FileSize_String3` -> `File size`.
///
/// Unknown keys lose their `_String`/`_Url` suffix and have underscores
/// turned into spaces.
pub fn display_key(key: &str) -> String {
    if let Some(name) = display_name(key) {
        return name.to_string();
    }
    let base = DISPLAY_SUFFIX_REGEX.replace(key, "");
    match display_name(&base) {
        Some(name) => name.to_string(),
        None => base.replace('_', " ").trim().to_string(),
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn track_heading(track: &MediaTrack) -> String {
    let kind = track
        .kind()
        .map(|kind| kind.to_string())
        .unwrap_or_default();
    match track.text_field("@typeorder") {
        Some(order) => format!("{kind} #{order}"),
        None => kind,
    }
}

fn push_field(out: &mut String, track: &MediaTrack, key: &str, value: &Value) {
    if IGNORED_KEYS.contains(&key) {
        return;
    }
    if key == "StreamKind"
        && track.kind() == Some(TrackKind::General)
        && value.as_str() == Some("General")
    {
        return;
    }
    let Some(value) = display_value(value) else {
        return;
    };

    let label = display_key(key);
    let padding = COLUMN_WIDTH.saturating_sub(label.chars().count()).max(1);
    out.push_str(&format!("{label}{}: {value}\n", " ".repeat(padding)));
}

/// Render `report` in the engine's text layout: a heading per track,
/// padded `Key : value` lines and a blank line between tracks.
pub fn render_text(report: &MediaReport) -> String {
    let tracks = report.tracks();
    let mut out = String::new();

    for track in &tracks {
        out.push_str(&track_heading(track));
        out.push('\n');

        for (key, value) in track.fields() {
            if key != "extra" {
                push_field(&mut out, track, key, value);
            }
        }
        if let Some(Value::Object(extra)) = track.get("extra") {
            for (key, value) in extra {
                push_field(&mut out, track, key, value);
            }
        }
        out.push('\n');
    }

    // Blank lines separate tracks; the last one is not followed by one.
    if out.ends_with("\n\n") {
        out.pop();
    }
    out
}

/// One cleaned line per audio and subtitle track.
pub fn render_summary(report: &MediaReport) -> String {
    let mut out = String::new();

    for track in report.tracks() {
        match track.kind() {
            Some(TrackKind::Audio) => {
                let audio = AudioDisplay::from_track(&track, false);
                let details = [
                    audio.format.unwrap_or_default(),
                    audio.channels,
                    audio.bitrate,
                ]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
                out.push_str(&format!("Audio     {}", audio.language));
                if let Some(title) = audio.title {
                    out.push_str(&format!(" - {title}"));
                }
                out.push_str(&format!(" [{details}]\n"));
            }
            Some(TrackKind::Text) => {
                let subtitle = SubtitleDisplay::from_track(&track, false);
                out.push_str(&format!("Subtitle  {}", subtitle.language));
                if subtitle.show_title
                    && let Some(title) = &subtitle.title
                {
                    out.push_str(&format!(" - {title}"));
                }
                if let Some(format) = &subtitle.format {
                    out.push_str(&format!(" [{format}]"));
                }
                if subtitle.default {
                    out.push_str(" (default)");
                }
                if subtitle.forced {
                    out.push_str(" (forced)");
                }
                out.push('\n');
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MediaReport {
        MediaReport::new(json!({
            "media": { "@ref": "", "track": [
                {
                    "@type": "General",
                    "Count": 359,
                    "StreamKind": "General",
                    "Format": "MPEG-4",
                    "FileSize_String": "4.17 MiB",
                    "Encoded_Application_String": "Lavf52.62.0",
                    "Title": "",
                    "CompleteName": "trailer.mp4"
                },
                {
                    "@type": "Video",
                    "StreamOrder": "0",
                    "Format": "AVC",
                    "Display_Custom_Thing": 3,
                    "extra": { "CodecConfigurationBox": "avcC" }
                }
            ]}
        }))
    }

    #[test]
    fn test_display_keys() {
        assert_eq!(display_key("CompleteName"), "Complete name");
        assert_eq!(display_key("FileSize_String3"), "File size");
        assert_eq!(display_key("CodecID_Url"), "Codec ID/Url");
        assert_eq!(display_key("BitRate_Mode_String"), "Bit rate mode");
        assert_eq!(display_key("Custom_Field_String"), "Custom Field");
    }

    #[test]
    fn test_render_text_layout() {
        let text = render_text(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "General");
        assert_eq!(lines[1], format!("{:<40}: MPEG-4", "Format"));
        assert!(text.contains(&format!("{:<40}: 4.17 MiB", "File size")));
        assert!(text.contains(&format!("{:<40}: trailer.mp4", "Complete name")));
        assert!(text.contains(&format!("{:<40}: avcC", "Codec configuration box")));
        assert!(text.contains(&format!("{:<40}: 3", "Display Custom Thing")));
        assert!(!text.contains("Kind of stream"));
        assert!(!text.contains("Title"));
        assert!(!text.contains("StreamOrder"));
        assert!(text.contains("\n\nVideo\n"));
        assert!(text.ends_with(": avcC\n"));
    }

    #[test]
    fn test_render_text_without_tracks() {
        assert_eq!(render_text(&MediaReport::new(json!({}))), "");
    }

    #[test]
    fn test_long_keys_keep_one_space() {
        let mut out = String::new();
        let key = "A_Very_Long_Key_Name_That_Exceeds_The_Column_Width";
        push_field(&mut out, &MediaTrack::new(), key, &json!("x"));
        assert_eq!(
            out,
            "A Very Long Key Name That Exceeds The Column Width : x\n"
        );
    }

    #[test]
    fn test_summary_lines() {
        let report = MediaReport::new(json!({
            "media": { "track": [
                {
                    "@type": "Audio",
                    "Language_String": "English",
                    "Format": "AAC",
                    "Channels": 2,
                    "Title": "English AAC Stereo",
                    "BitRate_String": "127 kb/s"
                },
                {
                    "@type": "Text",
                    "Language_String": "German",
                    "Title": "German (Forced)",
                    "Forced": "Yes",
                    "Format": "UTF-8"
                }
            ]}
        }));
        let summary = render_summary(&report);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Audio     English [AAC, Stereo, 127 kb/s]");
        assert_eq!(lines[1], "Subtitle  German [UTF-8] (forced)");
    }
}
