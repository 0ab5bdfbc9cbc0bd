//! Options for a managed resource.
//!
//! Options can be built in code or loaded from a TOML table:
//!
//! ```toml
//! data_key = "users"
//! id_key = "uuid"
//! insert_position = "end"
//! fetch_exclusion = "global"
//! should_fetch = true
//! initial_page = 1
//! ```

use list_core::{FetchExclusion, InsertPosition, DEFAULT_ID_KEY};
use list_types::DEFAULT_DATA_KEY;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Behavior switches for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceOptions {
    /// Response field holding the records, for the default extractor (default: "data").
    #[serde(default = "default_data_key")]
    pub data_key: String,
    /// Record field holding the identifier (default: "id").
    #[serde(default = "default_id_key")]
    pub id_key: String,
    /// Where locally added records go (default: start).
    #[serde(default)]
    pub insert_position: InsertPosition,
    /// Overlapping-fetch policy (default: per_mode).
    #[serde(default)]
    pub fetch_exclusion: FetchExclusion,
    /// Whether `start()` performs the initial load (default: true).
    #[serde(default = "default_should_fetch")]
    pub should_fetch: bool,
    /// Page requested by the initial load (default: 1).
    #[serde(default = "default_initial_page")]
    pub initial_page: u32,
}

// Default value functions
fn default_data_key() -> String {
    DEFAULT_DATA_KEY.to_string()
}

fn default_id_key() -> String {
    DEFAULT_ID_KEY.to_string()
}

fn default_should_fetch() -> bool {
    true
}

fn default_initial_page() -> u32 {
    1
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            data_key: default_data_key(),
            id_key: default_id_key(),
            insert_position: InsertPosition::default(),
            fetch_exclusion: FetchExclusion::default(),
            should_fetch: default_should_fetch(),
            initial_page: default_initial_page(),
        }
    }
}

impl ResourceOptions {
    /// Parse options from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_key.is_empty() {
            return Err(ConfigError::Invalid("data_key must not be empty".into()));
        }
        if self.id_key.is_empty() {
            return Err(ConfigError::Invalid("id_key must not be empty".into()));
        }
        if self.initial_page == 0 {
            return Err(ConfigError::Invalid("initial_page is 1-based".into()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// Parsed but semantically invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let options = ResourceOptions::default();
        assert_eq!(options.data_key, "data");
        assert_eq!(options.id_key, "id");
        assert_eq!(options.insert_position, InsertPosition::Start);
        assert_eq!(options.fetch_exclusion, FetchExclusion::PerMode);
        assert!(options.should_fetch);
        assert_eq!(options.initial_page, 1);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let options = ResourceOptions::from_toml_str("").unwrap();
        assert_eq!(options, ResourceOptions::default());
    }

    #[test]
    fn parses_every_field() {
        let options = ResourceOptions::from_toml_str(
            r#"
            data_key = "users"
            id_key = "uuid"
            insert_position = "end"
            fetch_exclusion = "global"
            should_fetch = false
            initial_page = 2
            "#,
        )
        .unwrap();

        assert_eq!(options.data_key, "users");
        assert_eq!(options.id_key, "uuid");
        assert_eq!(options.insert_position, InsertPosition::End);
        assert_eq!(options.fetch_exclusion, FetchExclusion::Global);
        assert!(!options.should_fetch);
        assert_eq!(options.initial_page, 2);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ResourceOptions::from_toml_str(r#"fetch_exclusion = "sometimes""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn rejects_zero_page() {
        let err = ResourceOptions::from_toml_str("initial_page = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_key = \"items\"").unwrap();

        let options = ResourceOptions::from_file(file.path()).unwrap();
        assert_eq!(options.data_key, "items");
    }

    #[test]
    fn invalid_file_names_its_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_page = \"one\"").unwrap();

        let err = ResourceOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(&err, ConfigError::ParseError { path, .. } if path == file.path()));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id_key = \"\"").unwrap();
        let err = ResourceOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ResourceOptions::from_file(Path::new("/nonexistent/reslist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("/nonexistent/reslist.toml"));
    }
}
