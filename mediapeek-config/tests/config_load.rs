//! Loading configuration files from disk.

use mediapeek_config::{ConfigLoadError, ConfigLoader, EnvConfig};
use std::fs;
use std::time::Duration;

fn empty_env() -> EnvConfig {
    EnvConfig::default()
}

#[test]
fn file_in_search_root_is_picked_up() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    fs::write(
        root.path().join("mediapeek.toml"),
        r#"
        [fetch]
        max_bytes = 65536
        user_agent = "mediapeek-test"
        connect_timeout = "3s"

        [analysis]
        cover_data = true

        [logging]
        level = "debug"
        "#,
    )?;

    let load = ConfigLoader::new()
        .with_env(empty_env())
        .with_search_root(root.path())
        .load()?;

    assert!(load.config_present);
    let config = load.config;
    assert_eq!(config.fetch.max_bytes, 65536);
    assert_eq!(config.fetch.user_agent, "mediapeek-test");
    assert_eq!(config.fetch.connect_timeout, Duration::from_secs(3));
    assert_eq!(config.fetch.request_timeout, Duration::from_secs(60));
    assert!(config.analysis.cover_data);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.metadata.config_path,
        Some(root.path().join("mediapeek.toml"))
    );
    Ok(())
}

#[test]
fn nested_default_location_is_searched() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    fs::create_dir_all(root.path().join("config"))?;
    fs::write(
        root.path().join("config/mediapeek.toml"),
        "[analysis]\nchunk_size = 1024\n",
    )?;

    let load = ConfigLoader::new()
        .with_env(empty_env())
        .with_search_root(root.path())
        .load()?;
    assert_eq!(load.config.analysis.chunk_size, 1024);
    Ok(())
}

#[test]
fn no_file_falls_back_to_defaults() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let load = ConfigLoader::new()
        .with_env(empty_env())
        .with_search_root(root.path())
        .load()?;

    assert!(!load.config_present);
    assert_eq!(load.config.metadata.config_path, None);
    assert_eq!(load.config.fetch.max_bytes, 10 * 1024 * 1024);
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let err = ConfigLoader::new()
        .with_env(empty_env())
        .with_config_path(root.path().join("absent.toml"))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn malformed_file_reports_parse_error() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("broken.toml");
    fs::write(&path, "[fetch\nmax_bytes = ")?;

    let err = ConfigLoader::new()
        .with_env(empty_env())
        .with_config_path(&path)
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
    Ok(())
}

#[test]
fn env_path_and_values_override_the_file() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("custom.toml");
    fs::write(&path, "[fetch]\nmax_bytes = 100\nrequest_timeout = \"5s\"\n")?;

    let env = EnvConfig::from_lookup(|name| match name {
        "MEDIAPEEK_CONFIG" => Some(path.display().to_string()),
        "MEDIAPEEK_REQUEST_TIMEOUT" => Some("2m".to_string()),
        _ => None,
    });
    let config = ConfigLoader::new().with_env(env).load()?.config;

    assert_eq!(config.fetch.max_bytes, 100);
    assert_eq!(config.fetch.request_timeout, Duration::from_secs(120));
    Ok(())
}
