//! Configuration for reslist.
//!
//! ```toml
//! [fixture]
//! path = "users.json"
//! page_size = 10
//!
//! [resource]
//! id_key = "id"
//! insert_position = "end"
//! ```

use anyhow::{Context, Result};
use list_client::ResourceOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "reslist.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Fixture settings.
    #[serde(default)]
    pub fixture: FixtureConfig,
    /// Options for the managed resource.
    #[serde(default)]
    pub resource: ResourceOptions,
}

/// Where records live and how they are paged.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureConfig {
    /// JSON array file holding the records.
    #[serde(default = "default_fixture_path")]
    pub path: PathBuf,
    /// Records per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("records.json")
}

fn default_page_size() -> usize {
    10
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            path: default_fixture_path(),
            page_size: default_page_size(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`.
    ///
    /// A missing default config file yields the defaults. An explicitly named
    /// file must exist. A relative fixture path is resolved against the
    /// config file's directory.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.resource.validate()?;
        if config.fixture.page_size == 0 {
            anyhow::bail!("fixture.page_size must be at least 1");
        }

        if config.fixture.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.fixture.path = dir.join(&config.fixture.path);
            }
        }
        Ok(config)
    }
}
