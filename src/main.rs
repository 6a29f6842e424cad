use clap::Parser;
use tracing_subscriber::EnvFilter;

use docsql::cli::Args;
use docsql::config;
use docsql::query::StructuralCache;

/// Environment variable holding the log filter (e.g. `docsql=debug`)
const LOG_ENV: &str = "DOCSQL_LOG";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cache = StructuralCache::new(config::resolve(args.config.as_deref())?);
    let output = args.command.run(&cache, args.format)?;
    println!("{}", output);
    Ok(())
}
