use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stream kind carried in a track's `@type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackKind {
    General,
    Video,
    Audio,
    /// Subtitle stream (`Text` in the engine's vocabulary).
    Text,
    Image,
    Menu,
    Other(String),
}

impl TrackKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "General" => TrackKind::General,
            "Video" => TrackKind::Video,
            "Audio" => TrackKind::Audio,
            "Text" => TrackKind::Text,
            "Image" => TrackKind::Image,
            "Menu" => TrackKind::Menu,
            other => TrackKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TrackKind::General => "General",
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
            TrackKind::Image => "Image",
            TrackKind::Menu => "Menu",
            TrackKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw metadata for one stream, exactly as the metadata engine produced it.
///
/// Values may be strings, numbers or nested objects. Anything that is not a
/// JSON object is treated as an empty track, so readers never fail on
/// malformed input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaTrack(Map<String, Value>);

impl MediaTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self(map.clone()),
            _ => Self::default(),
        }
    }

    pub fn kind(&self) -> Option<TrackKind> {
        self.str_field("@type").map(TrackKind::parse)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field value when it is a JSON string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Field value rendered as text when it is a string or a number.
    pub fn text_field(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// True when the field holds the string `"Yes"`.
    pub fn flag(&self, field: &str) -> bool {
        self.str_field(field) == Some("Yes")
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for MediaTrack {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
