//! Login command implementation

use colored::Colorize;

use crate::cli::CommandContext;
use infocmdb::Result;

/// Log in with the configured credentials and report the outcome
pub async fn run(config_path: &str) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;

    println!(
        "{} Logged in to {} as {}",
        "✓".green(),
        ctx.client.config().url,
        ctx.client.config().username
    );
    println!("  Config: {}", ctx.config_path.display());
    Ok(())
}
