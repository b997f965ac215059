use serde::{Deserialize, Serialize};
use std::fmt;

/// Output flavours the metadata engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Structured per-track object, serialised as JSON.
    Object,
    Text,
    Xml,
    Html,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 4] = [
        ReportFormat::Object,
        ReportFormat::Text,
        ReportFormat::Xml,
        ReportFormat::Html,
    ];

    /// Key under which the generated view is stored in analysis results.
    pub fn result_key(self) -> &'static str {
        match self {
            ReportFormat::Object => "json",
            ReportFormat::Text => "text",
            ReportFormat::Xml => "xml",
            ReportFormat::Html => "html",
        }
    }

    /// Name of the view as the engine labels it.
    pub fn type_name(self) -> &'static str {
        match self {
            ReportFormat::Object => "object",
            ReportFormat::Text => "Text",
            ReportFormat::Xml => "XML",
            ReportFormat::Html => "HTML",
        }
    }

    /// Whether a caller-supplied token (`json`, `TEXT`, `object`, ...) names this format.
    pub fn matches(self, requested: &str) -> bool {
        let requested = requested.trim().to_ascii_lowercase();
        requested == self.result_key()
            || requested == self.type_name().to_ascii_lowercase()
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
