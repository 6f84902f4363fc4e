use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEVIN_API_KEY_ENV: &str = "DEVIN_API_KEY";
pub const DEVIN_BASE_URL_ENV: &str = "DEVIN_BASE_URL";

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    ///
    /// The file on disk is left untouched; the caller keeps its last-known
    /// good configuration.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Server-side configuration for the bridge.
///
/// The Devin API key is the one required secret. It is only ever read here
/// and handed to the upstream client; nothing in the HTTP surface echoes it
/// back.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    pub devin_api_key: Option<String>,
    /// Override for the upstream base URL, used by tests and self-hosted
    /// gateways.
    pub devin_base_url: Option<String>,
    /// Listen address for the HTTP server.
    pub bind: Option<String>,
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    /// Environment variables win over the file.
    pub fn load() -> Result<Config, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from_path(&path)?,
            None => Config::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "devin-bridge")?;
        Some(proj_dirs.config_dir().join("config.toml"))
    }

    /// Applies `DEVIN_API_KEY` / `DEVIN_BASE_URL` on top of whatever the
    /// file provided. Environment wins.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(DEVIN_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.devin_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(DEVIN_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.devin_base_url = Some(url);
            }
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.devin_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.devin_base_url
            .as_deref()
            .unwrap_or(crate::api::DEVIN_API_BASE_URL)
    }

    pub fn bind_addr(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();

        assert!(config.devin_api_key.is_none());
        assert_eq!(config.base_url(), crate::api::DEVIN_API_BASE_URL);
        assert_eq!(config.bind_addr(), DEFAULT_BIND);
    }

    #[test]
    fn parses_toml_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "devin_api_key = \"secret\"\ndevin_base_url = \"http://127.0.0.1:9/v1\"\nbind = \"0.0.0.0:8080\""
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.base_url(), "http://127.0.0.1:9/v1");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "devin_api_key = [not toml").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        // The broken file is left as-is for the user to fix.
        assert_eq!(fs::read_to_string(&path).unwrap(), "devin_api_key = [not toml");
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let config = Config {
            devin_api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
