pub mod sources;

use mediapeek_core::analysis::{AnalysisOptions, DEFAULT_CHUNK_SIZE};
use mediapeek_core::fetch::DEFAULT_USER_AGENT;
use mediapeek_core::{FetchError, FetchOptions, ReqwestTransport};
use mediapeek_model::DEFAULT_MAX_BYTES;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Most bytes held in memory for one request.
    pub max_bytes: usize,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl FetchConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn transport(&self) -> Result<ReqwestTransport, FetchError> {
        ReqwestTransport::new(self.connect_timeout, self.request_timeout)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub chunk_size: usize,
    pub cover_data: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cover_data: false,
        }
    }
}

impl AnalysisConfig {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            chunk_size: self.chunk_size,
            cover_data: self.cover_data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
}
