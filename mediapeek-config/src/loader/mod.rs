pub mod error;

use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use self::error::ConfigLoadError;
use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    AnalysisConfig, Config, ConfigMetadata, FetchConfig, LoggingConfig,
};
use crate::util::parse_duration;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("mediapeek.toml"),
        PathBuf::from("config/mediapeek.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    /// Environment snapshot to use instead of the process environment.
    pub env: Option<EnvConfig>,
    /// Directory the default config locations are resolved against.
    pub search_root: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    /// False when every value came from the environment or defaults.
    pub config_present: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn with_search_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.options.search_root = Some(root.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env = self.options.env.clone().unwrap_or_else(EnvConfig::gather);
        let (file_config, config_path) = self.load_file_config(&env)?;
        let config_present = file_config.is_some();

        let config =
            compose_config(file_config.unwrap_or_default(), env, config_path)?;
        Ok(ConfigLoad {
            config,
            config_present,
        })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => {
                let root = self.options.search_root.as_deref();
                match DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .map(|candidate| resolve_against(root, candidate))
                    .find(|candidate| candidate.exists())
                {
                    Some(path) => path,
                    None => return Ok((None, None)),
                }
            }
        };

        debug!(path = %path.display(), "loading configuration file");
        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn resolve_against(root: Option<&Path>, candidate: &Path) -> PathBuf {
    match root {
        Some(root) => root.join(candidate),
        None => candidate.to_path_buf(),
    }
}

/// Environment wins over the file, the file over defaults.
fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        fetch: file_fetch,
        analysis: file_analysis,
        logging: file_logging,
    } = file;
    let fetch_defaults = FetchConfig::default();
    let analysis_defaults = AnalysisConfig::default();

    let fetch = FetchConfig {
        max_bytes: env
            .max_bytes
            .or(file_fetch.max_bytes)
            .unwrap_or(fetch_defaults.max_bytes),
        user_agent: env
            .user_agent
            .or(file_fetch.user_agent)
            .unwrap_or(fetch_defaults.user_agent),
        connect_timeout: duration_setting(
            "connect_timeout",
            env.connect_timeout.or(file_fetch.connect_timeout),
            fetch_defaults.connect_timeout,
        )?,
        request_timeout: duration_setting(
            "request_timeout",
            env.request_timeout.or(file_fetch.request_timeout),
            fetch_defaults.request_timeout,
        )?,
    };

    let analysis = AnalysisConfig {
        chunk_size: env
            .chunk_size
            .or(file_analysis.chunk_size)
            .unwrap_or(analysis_defaults.chunk_size),
        cover_data: env
            .cover_data
            .or(file_analysis.cover_data)
            .unwrap_or(analysis_defaults.cover_data),
    };

    let logging = LoggingConfig {
        level: env
            .log_level
            .or(file_logging.level)
            .unwrap_or_else(|| LoggingConfig::default().level),
    };

    let config = Config {
        fetch,
        analysis,
        logging,
        metadata: ConfigMetadata { config_path },
    };
    validate(&config)?;
    Ok(config)
}

fn duration_setting(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        None => Ok(default),
        Some(value) => parse_duration(&value).map_err(|source| {
            ConfigLoadError::InvalidDuration { key, value, source }
        }),
    }
}

fn validate(config: &Config) -> Result<(), ConfigLoadError> {
    if config.fetch.max_bytes == 0 {
        return Err(ConfigLoadError::Invalid {
            key: "max_bytes",
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.analysis.chunk_size == 0 {
        return Err(ConfigLoadError::Invalid {
            key: "chunk_size",
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.fetch.request_timeout.is_zero() {
        return Err(ConfigLoadError::Invalid {
            key: "request_timeout",
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
