//! Configuration loading for mediapeek and the command implementations of
//! the `mediapeek` binary.
//!
//! Settings come from an optional `mediapeek.toml` and `MEDIAPEEK_*`
//! environment variables; the environment wins over the file and the file
//! over built-in defaults.

pub mod cli;
pub mod loader;
pub mod models;
pub mod util;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError,
};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AnalysisConfig, Config, ConfigMetadata, FetchConfig, LoggingConfig,
};
