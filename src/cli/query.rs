//! Query command implementation

use crate::cli::CommandContext;
use infocmdb::Result;

/// Run a webservice query and print the result as JSON
pub async fn run(
    config_path: &str,
    webservice: &str,
    params: &[(String, String)],
    raw: bool,
) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;
    let params: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    if raw {
        let body = ctx.client.query_raw(webservice, &params).await?;
        println!("{}", body);
    } else {
        let data = ctx.client.query(webservice, &params).await?;
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}
