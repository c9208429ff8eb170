//! Command execution context
//!
//! Loads the configuration, builds the client and logs in, so commands
//! start from an authenticated session.

use std::path::PathBuf;

use infocmdb::{CmdbClient, Config, Result};

pub struct CommandContext {
    /// Resolved config file location
    pub config_path: PathBuf,
    /// Authenticated client
    pub client: CmdbClient,
}

impl CommandContext {
    /// Load config from `config_path` (resolved like workflow configs) and log in.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or the login is refused.
    pub async fn new(config_path: &str) -> Result<Self> {
        let config_path = Config::resolve_path(config_path);
        let config = Config::load_from(config_path.clone())?;

        let client = CmdbClient::new(config)?;
        client.login().await?;
        log::debug!("Authenticated against {}", client.config().url);

        Ok(Self {
            config_path,
            client,
        })
    }
}
