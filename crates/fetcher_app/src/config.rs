//! Optional RON configuration for the fetcher.
//!
//! Every field may be omitted; missing fields keep the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fetcher_engine::FetchSettings;
use fetcher_logging::{fetcher_debug, fetcher_info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "image_fetcher.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    pub request_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            storage_dir: settings.storage_dir,
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            read_timeout_secs: settings.read_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
            user_agent: settings.user_agent,
            request_delay_ms: settings.request_delay.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            storage_dir: self.storage_dir.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }
}

/// Loads `path`, or `image_fetcher.ron` in the working directory if it exists.
///
/// An explicit path must exist; the default file is optional.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_config(default_path)
            } else {
                fetcher_debug!("No {} found; using defaults", DEFAULT_CONFIG_FILE);
                Ok(AppConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("could not read config {:?}", path))?;
    let config: AppConfig =
        ron::from_str(&content).with_context(|| format!("could not parse config {:?}", path))?;
    fetcher_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_settings() {
        assert_eq!(AppConfig::default().to_settings(), FetchSettings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("fetcher.ron");
        fs::write(&path, r#"(storage_dir: "pics", request_delay_ms: 500)"#).unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("pics"));
        assert_eq!(config.request_delay_ms, 500);
        assert_eq!(config.max_bytes, 50 * 1024 * 1024);

        let settings = config.to_settings();
        assert_eq!(settings.request_delay, Duration::from_millis(500));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn written_config_round_trips() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("fetcher.ron");
        let config = AppConfig {
            redirect_limit: 3,
            ..AppConfig::default()
        };
        let text =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        fs::write(&path, text).unwrap();

        assert_eq!(load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(load(Some(&temp.path().join("absent.ron"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(storage_dir: 42").unwrap();
        assert!(load(Some(&path)).is_err());
    }
}
