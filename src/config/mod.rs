//! Configuration management for the infoCMDB client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "infocmdb.yml";

/// Environment variable pointing at the workflow's config location
pub const WORKFLOW_CONFIG_PATH_ENV: &str = "WORKFLOW_CONFIG_PATH";

/// Connection settings for one infoCMDB instance.
///
/// Loaded once and never mutated afterwards. The session token obtained by
/// logging in lives on the client, not here.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Base URL of the infoCMDB web service
    #[serde(alias = "apiUrl")]
    pub url: String,

    /// Installation base path of the CMDB (e.g. `/app/`)
    #[serde(alias = "CmdbBasePath")]
    pub base_path: String,

    /// Login user
    #[serde(alias = "apiUser")]
    pub username: String,

    /// Login password
    #[serde(alias = "apiPassword")]
    pub password: String,

    /// Pre-issued API token; skips the login round trip when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Where the client will get its credentials from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    ApiKey,
    Password,
    Missing,
}

impl Config {
    /// Create a configuration for the given base URL with no credentials
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set username and password
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set a pre-issued API token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the CMDB installation base path
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Resolve a config path the way workflows expect it.
    ///
    /// The path is used as given if it exists. Otherwise it is looked up
    /// relative to the directory of `WORKFLOW_CONFIG_PATH`, then inside the
    /// user config directory (`~/.config/infocmdb` on Linux).
    pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
        let workflow_config = std::env::var(WORKFLOW_CONFIG_PATH_ENV).ok();
        Self::resolve_path_with(path.as_ref(), workflow_config.as_deref())
    }

    fn resolve_path_with(path: &Path, workflow_config: Option<&str>) -> PathBuf {
        if path.exists() {
            log::debug!("Config file found at {}", path.display());
            return path.to_path_buf();
        }

        let mut candidates = Vec::new();
        if let Some(workflow_config) = workflow_config {
            let dir = Path::new(workflow_config)
                .parent()
                .unwrap_or_else(|| Path::new(""));
            log::debug!("{}: {}", WORKFLOW_CONFIG_PATH_ENV, dir.display());
            candidates.push(dir.join(path));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("infocmdb").join(path));
        }

        candidates
            .into_iter()
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| path.to_path_buf())
    }

    /// Load and validate configuration, resolving the path first
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path))
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config = Self::from_yaml(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is usable
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("url must not be empty".to_string()).into());
        }

        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| ConfigError::Invalid(format!("url '{}': {}", self.url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConfigError::Invalid(format!("unsupported url scheme '{}'", scheme)).into()),
        }
    }

    /// Report which credentials are available
    pub fn credential_source(&self) -> CredentialSource {
        if self.api_key.as_deref().is_some_and(|key| !key.is_empty()) {
            CredentialSource::ApiKey
        } else if !self.username.is_empty() && !self.password.is_empty() {
            CredentialSource::Password
        } else {
            CredentialSource::Missing
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("base_path", &self.base_path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(
            "url: http://localhost\nusername: admin\npassword: admin\nbasePath: /app/\n",
        )
        .unwrap();

        assert_eq!(config.url, "http://localhost");
        assert_eq!(config.username, "admin");
        assert_eq!(config.base_path, "/app/");
        assert!(config.api_key.is_none());
        assert_eq!(config.credential_source(), CredentialSource::Password);
    }

    #[test]
    fn test_parse_legacy_keys() {
        let config = Config::from_yaml(
            "apiUrl: https://cmdb.example.com\napiUser: workflow\napiPassword: secret\nCmdbBasePath: /var/www/cmdb/\n",
        )
        .unwrap();

        assert_eq!(config.url, "https://cmdb.example.com");
        assert_eq!(config.username, "workflow");
        assert_eq!(config.password, "secret");
        assert_eq!(config.base_path, "/var/www/cmdb/");
    }

    #[test]
    fn test_api_key_takes_precedence() {
        let config = Config::new("http://localhost")
            .with_credentials("admin", "admin")
            .with_api_key("token");
        assert_eq!(config.credential_source(), CredentialSource::ApiKey);

        let config = Config::new("http://localhost").with_credentials("admin", "");
        assert_eq!(config.credential_source(), CredentialSource::Missing);
    }

    #[test]
    fn test_empty_url_is_invalid() {
        let err = Config::from_yaml("username: admin\npassword: admin\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_http_url_is_invalid() {
        let err = Config::new("ftp://cmdb").validate().unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Config::from_yaml("url: [http://localhost").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        let err = Config::load_from(temp.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "url: http://localhost\napiKey: abc\n").unwrap();

        let config = Config::load_from(path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_resolve_relative_to_workflow_config_path() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("wf.yml"), "url: http://localhost\n").unwrap();
        let workflow_config = temp.path().join("workflow.json");

        let resolved = Config::resolve_path_with(
            Path::new("wf.yml"),
            Some(workflow_config.to_str().unwrap()),
        );
        assert_eq!(resolved, temp.path().join("wf.yml"));
    }

    #[test]
    fn test_resolve_keeps_unknown_path() {
        let resolved = Config::resolve_path_with(Path::new("does-not-exist-4711.yml"), None);
        assert_eq!(resolved, PathBuf::from("does-not-exist-4711.yml"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("http://localhost")
            .with_credentials("admin", "hunter2")
            .with_api_key("tok");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok\""));
    }
}
