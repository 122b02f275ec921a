//! Configuration model loaded from external sources.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::types::{PageSize, TypeConstraintError};
use crate::pagination::{COMPACT_WINDOW, WIDE_WINDOW};

#[derive(Clone, Debug, Deserialize)]
/// Settings of the back-office client.
pub struct AppConfig {
    /// Base URL of the REST API, e.g. `https://shop.example.com/api`.
    pub api_url: String,
    /// Directory holding the persisted session and cart.
    pub storage_dir: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default)]
    pub search_max_wait_ms: Option<u64>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub wide_pagination: bool,
}

fn default_page_size() -> usize {
    PageSize::default().get()
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Reads `{dir}/default.yaml`, the optional `{dir}/{app_env}.yaml`
    /// profile and `APP_*` environment variables, in that order.
    pub fn load(dir: &Path, app_env: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(dir.join("default")))
            .add_source(File::from(dir.join(app_env)).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn page_size(&self) -> Result<PageSize, TypeConstraintError> {
        PageSize::new(self.page_size)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_quiet_period(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn search_max_wait(&self) -> Option<Duration> {
        self.search_max_wait_ms.map(Duration::from_millis)
    }

    pub fn pagination_window(&self) -> usize {
        if self.wide_pagination {
            WIDE_WINDOW
        } else {
            COMPACT_WINDOW
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn profile_overrides_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("default.yaml"),
            "api_url: http://localhost:8080/api\nstorage_dir: ./state\n",
        )
        .expect("write default");
        fs::write(
            dir.path().join("staging.yaml"),
            "page_size: 50\nwide_pagination: true\n",
        )
        .expect("write profile");

        let config = AppConfig::load(dir.path(), "staging").expect("config");

        assert_eq!(config.page_size().expect("allowed").get(), 50);
        assert_eq!(config.pagination_window(), WIDE_WINDOW);
        assert_eq!(config.search_quiet_period(), Duration::from_millis(500));
        assert_eq!(config.search_max_wait(), None);
    }

    #[test]
    fn missing_profile_is_optional() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("default.yaml"),
            "api_url: http://localhost:8080/api\nstorage_dir: ./state\npage_size: 15\n",
        )
        .expect("write default");

        let config = AppConfig::load(dir.path(), "local").expect("config");

        assert_eq!(config.pagination_window(), COMPACT_WINDOW);
        assert!(config.page_size().is_err());
    }
}
