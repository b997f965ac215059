use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{non_empty, parse_bool, parse_byte_count};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub fetch: FileFetchConfig,
    #[serde(default)]
    pub analysis: FileAnalysisConfig,
    #[serde(default)]
    pub logging: FileLoggingConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileFetchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// `humantime` string, e.g. `"10s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAnalysisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_data: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub max_bytes: Option<usize>,
    pub user_agent: Option<String>,
    pub connect_timeout: Option<String>,
    pub request_timeout: Option<String>,
    pub chunk_size: Option<usize>,
    pub cover_data: Option<bool>,
    pub log_level: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; unset and blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(lookup(name));

        Self {
            config_path: var("MEDIAPEEK_CONFIG").map(PathBuf::from),
            max_bytes: var("MEDIAPEEK_MAX_BYTES")
                .and_then(|raw| parse_byte_count(&raw)),
            user_agent: var("MEDIAPEEK_USER_AGENT"),
            connect_timeout: var("MEDIAPEEK_CONNECT_TIMEOUT"),
            request_timeout: var("MEDIAPEEK_REQUEST_TIMEOUT"),
            chunk_size: var("MEDIAPEEK_CHUNK_SIZE")
                .and_then(|raw| parse_byte_count(&raw)),
            cover_data: var("MEDIAPEEK_COVER_DATA")
                .and_then(|raw| parse_bool(&raw)),
            log_level: var("MEDIAPEEK_LOG_LEVEL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_lookup_ignores_blank_and_garbage() {
        let vars = HashMap::from([
            ("MEDIAPEEK_MAX_BYTES", "1_048_576"),
            ("MEDIAPEEK_USER_AGENT", "  "),
            ("MEDIAPEEK_COVER_DATA", "yes"),
            ("MEDIAPEEK_CHUNK_SIZE", "big"),
        ]);
        let env = EnvConfig::from_lookup(|name| {
            vars.get(name).map(|value| value.to_string())
        });

        assert_eq!(env.max_bytes, Some(1_048_576));
        assert_eq!(env.user_agent, None);
        assert_eq!(env.cover_data, Some(true));
        assert_eq!(env.chunk_size, None);
        assert_eq!(env.config_path, None);
    }

    #[test]
    fn test_file_config_sections_are_optional() {
        let parsed: FileConfig = toml::from_str(
            r#"
            [fetch]
            max_bytes = 2048
            request_timeout = "2m"
            "#,
        )
        .expect("parse");
        assert_eq!(parsed.fetch.max_bytes, Some(2048));
        assert_eq!(parsed.fetch.request_timeout.as_deref(), Some("2m"));
        assert_eq!(parsed.analysis.chunk_size, None);
        assert_eq!(parsed.logging.level, None);
    }
}
