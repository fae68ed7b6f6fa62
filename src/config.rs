//! Optional YAML configuration.
//!
//! Every key has a default, so the file may set only what differs:
//!
//! ```yaml
//! out_dir: /srv/tablet
//! user_agent: "tablet_archiver (ops@example.com)"
//! ```

use crate::api::Endpoints;
use crate::models::EditionDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive root; one subdirectory per edition date.
    pub out_dir: PathBuf,
    /// Manifest URL template, `{date}` is replaced with `YYYYMMDD`.
    pub manifest_url: String,
    /// Asset URL template with `{date}` and `{file}` placeholders.
    pub asset_url: String,
    pub user_agent: String,
    /// Default start of `--range` and `--all`.
    pub first_date: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            manifest_url: "https://www.washingtonpost.com/wp-stat/tablet/v1.1/{date}/tablet_{date}.json"
                .to_string(),
            asset_url: "https://www.washingtonpost.com/wp-stat/tablet/v1.1/{date}/{file}".to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            first_date: EditionDate::FIRST_KNOWN.to_string(),
        }
    }
}

impl Config {
    /// Load `path` if given, otherwise use the defaults.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_yaml(&text)?;
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.manifest_url.contains("{date}") {
            return Err(ConfigError::Invalid(
                "manifest_url must contain {date}".to_string(),
            ));
        }
        if !self.asset_url.contains("{file}") {
            return Err(ConfigError::Invalid("asset_url must contain {file}".to_string()));
        }
        self.first_date()?;
        Ok(())
    }

    pub fn first_date(&self) -> Result<EditionDate, ConfigError> {
        self.first_date
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("first_date: {e}")))
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.manifest_url.clone(), self.asset_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert_eq!(config.first_date().unwrap().to_string(), "20150520");
        assert_eq!(
            config.endpoints().manifest_url("20150520").unwrap().as_str(),
            "https://www.washingtonpost.com/wp-stat/tablet/v1.1/20150520/tablet_20150520.json"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("out_dir: /srv/tablet\nfirst_date: \"20200101\"\n").unwrap();
        assert_eq!(config.out_dir, PathBuf::from("/srv/tablet"));
        assert_eq!(config.first_date, "20200101");
        assert_eq!(config.asset_url, Config::default().asset_url);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(Config::from_yaml("\n").unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file_and_validate() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "asset_url: https://cdn.test/{date}/assets\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let tmp = tempdir().unwrap();
        let err = Config::load(Some(&tmp.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_bad_first_date_rejected() {
        let config = Config {
            first_date: "2015-05-20".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
