use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::track::{MediaTrack, TrackKind};

/// Structured document returned by the metadata engine:
/// `{ "creatingLibrary": {...}, "media": { "@ref": "...", "track": [...] } }`.
///
/// The document is kept as raw JSON so that fields this crate does not know
/// about survive a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReport(Value);

impl MediaReport {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn track_values(&self) -> Option<&Vec<Value>> {
        self.0.get("media")?.get("track")?.as_array()
    }

    /// All tracks in document order; absent or malformed lists yield nothing.
    pub fn tracks(&self) -> Vec<MediaTrack> {
        self.track_values()
            .map(|tracks| tracks.iter().map(MediaTrack::from_value).collect())
            .unwrap_or_default()
    }

    pub fn tracks_of(&self, kind: &TrackKind) -> Vec<MediaTrack> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind().as_ref() == Some(kind))
            .collect()
    }

    /// Mutable access to the `General` track's fields, if the report has one.
    pub fn general_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0
            .get_mut("media")?
            .get_mut("track")?
            .as_array_mut()?
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|track| {
                track.get("@type").and_then(Value::as_str) == Some("General")
            })
    }
}

impl From<Value> for MediaReport {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
