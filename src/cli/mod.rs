//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

use infocmdb::AttributeMutation;

pub mod context;
pub mod login;
pub mod query;
pub mod status;
pub mod update;

pub use context::CommandContext;

/// infoCMDB CLI - query and update an infoCMDB instance
#[derive(Parser, Debug)]
#[command(name = "infocmdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use (resolved against WORKFLOW_CONFIG_PATH and the user config dir)
    #[arg(
        long,
        global = true,
        env = "INFOCMDB_CONFIG",
        default_value = infocmdb::config::DEFAULT_CONFIG_FILE,
        hide_env = true
    )]
    pub config: String,

    /// Enable debug logging
    #[arg(long, global = true, env = "INFOCMDB_DEBUG", hide_env = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration status
    Status,

    /// Log in and check that the credentials are accepted
    Login,

    /// Run a named webservice query and print its rows
    Query {
        /// Webservice name, e.g. int_getCi
        webservice: String,

        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Print the response body exactly as received
        #[arg(long)]
        raw: bool,
    },

    /// Apply an attribute update batch to a CI
    Update {
        /// Target CI id
        ci_id: u64,

        /// Mutation as MODE:NAME[#CI_ATTRIBUTE_ID][=VALUE] (repeatable)
        #[arg(
            short = 'a',
            long = "attribute",
            required = true,
            value_parser = update::parse_mutation
        )]
        attributes: Vec<AttributeMutation>,
    },
}

/// Parse a KEY=VALUE pair
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("argv1=1").unwrap(),
            ("argv1".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_key_val("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_val("argv1=").unwrap(),
            ("argv1".to_string(), String::new())
        );
        assert!(parse_key_val("argv1").is_err());
        assert!(parse_key_val("=1").is_err());
    }

    #[test]
    fn test_query_command_collects_params() {
        let cli = Cli::try_parse_from([
            "infocmdb", "query", "int_getCi", "-p", "argv1=1", "--param", "argv2=x", "--raw",
        ])
        .unwrap();

        match cli.command {
            Commands::Query {
                webservice,
                params,
                raw,
            } => {
                assert_eq!(webservice, "int_getCi");
                assert_eq!(params.len(), 2);
                assert_eq!(params[1], ("argv2".to_string(), "x".to_string()));
                assert!(raw);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.config, "infocmdb.yml");
    }

    #[test]
    fn test_update_requires_an_attribute() {
        assert!(Cli::try_parse_from(["infocmdb", "update", "12"]).is_err());
    }
}
