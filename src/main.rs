//! infoCMDB CLI - query and update an infoCMDB instance from the shell

use clap::Parser;

mod cli;

use cli::{Cli, Commands};
use infocmdb::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let debug = cli.debug || infocmdb::logging::debug_from_env();
    if infocmdb::logging::init(debug, None).is_err() {
        eprintln!("Logger already initialized");
    }

    match cli.command {
        Commands::Status => cli::status::run(&cli.config),
        Commands::Login => cli::login::run(&cli.config).await,
        Commands::Query {
            webservice,
            params,
            raw,
        } => cli::query::run(&cli.config, &webservice, &params, raw).await,
        Commands::Update { ci_id, attributes } => {
            cli::update::run(&cli.config, ci_id, &attributes).await
        }
    }
}
