//! Status command implementation

use colored::Colorize;

use infocmdb::config::CredentialSource;
use infocmdb::{Config, Result};

/// Display configuration status without contacting the server
pub fn run(config_path: &str) -> Result<()> {
    println!("{}\n", "infoCMDB Configuration Status".bold());

    let path = Config::resolve_path(config_path);
    match Config::load_from(path.clone()) {
        Ok(config) => {
            println!("Config file: {}", path.display().to_string().cyan());
            println!("{} URL: {}", "✓".green(), config.url);

            if config.base_path.is_empty() {
                println!("{} No base path set", "○".dimmed());
            } else {
                println!("{} Base path: {}", "✓".green(), config.base_path);
            }

            match config.credential_source() {
                CredentialSource::ApiKey => {
                    println!("{} API token configured (login skipped)", "✓".green())
                }
                CredentialSource::Password => {
                    println!("{} Credentials configured for {}", "✓".green(), config.username)
                }
                CredentialSource::Missing => {
                    println!("{} No credentials configured", "✗".red());
                    println!("  → Set username and password in {}", path.display());
                }
            }
        }
        Err(e) => {
            println!("{} Configuration not found: {}", "✗".red(), e);
            println!("  → Create {} with url, username and password", config_path);
        }
    }

    Ok(())
}
