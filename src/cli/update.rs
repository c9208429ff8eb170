//! Update command implementation

use colored::Colorize;

use crate::cli::CommandContext;
use infocmdb::{AttributeMutation, Result, UpdateMode};

/// Parse `MODE:NAME[#CI_ATTRIBUTE_ID][=VALUE]`.
///
/// Everything after the first `=` is the value, so values may contain
/// `=` and `#`. Semantic checks are left to the update call.
pub fn parse_mutation(s: &str) -> std::result::Result<AttributeMutation, String> {
    let (mode, rest) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MODE:NAME[#ID][=VALUE], got '{}'", s))?;
    let mode: UpdateMode = mode.parse().map_err(|e| format!("{}", e))?;

    let (target, value) = match rest.split_once('=') {
        Some((target, value)) => (target, Some(value.to_string())),
        None => (rest, None),
    };

    let (name, ci_attribute_id) = match target.split_once('#') {
        Some((name, id)) => {
            let id = id
                .parse::<u64>()
                .map_err(|_| format!("invalid ci attribute id '{}'", id))?;
            (name, Some(id))
        }
        None => (target, None),
    };

    Ok(AttributeMutation {
        mode,
        name: name.to_string(),
        value,
        ci_attribute_id,
    })
}

/// Apply the mutations to `ci_id` in one batch
pub async fn run(config_path: &str, ci_id: u64, attributes: &[AttributeMutation]) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;
    ctx.client.update_ci_attributes(ci_id, attributes).await?;

    println!(
        "{} Updated {} attribute(s) of CI {}",
        "✓".green(),
        attributes.len(),
        ci_id
    );
    Ok(())
}
