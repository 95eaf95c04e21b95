mod render;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing_subscriber::EnvFilter;

use techgraph_core::{Config, Engine, QueryInput, StructuredQuery};

#[derive(Parser)]
#[command(name = "techgraph")]
#[command(about = "Diagnostic queries over an HVAC equipment knowledge graph", long_about = None)]
struct Cli {
    /// Config file (defaults to ./techgraph.toml, then ~/.config/techgraph/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question or look up an error code
    Query {
        /// Free text, e.g. "Error E458 en mi equipo AM080MXVAF"
        text: Vec<String>,
        /// Error code
        #[arg(short, long)]
        error_code: Option<String>,
        /// Product SKU
        #[arg(short, long)]
        sku: Option<String>,
        /// Region for installer lookups
        #[arg(short, long)]
        region: Option<String>,
        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Open the health page in a browser
        #[arg(long)]
        open: bool,
    },
    /// Verify the graph backend is reachable
    Check,
    /// Show node and relationship counts
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Print the default configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Query {
            text,
            error_code,
            sku,
            region,
            json,
        } => {
            let input = query_input(text, error_code, sku, region)?;
            let (_, engine) = start(cli.config.as_deref()).await?;
            let result = engine.process_query(input).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                render::print_result(&result);
            }
            if !result.success {
                std::process::exit(1);
            }
        }
        Commands::Serve { host, port, open } => {
            let (config, engine) = start(cli.config.as_deref()).await?;
            let serve_config = serve::ServeConfig {
                host: host.unwrap_or_else(|| config.server.host.clone()),
                port: port.unwrap_or(config.server.port),
                open_browser: open,
            };
            serve::start_server(engine, serve_config).await?;
        }
        Commands::Check => {
            let (config, engine) = start(cli.config.as_deref()).await?;
            match engine.health().await {
                Ok(()) => println!(
                    "Backend {} at {}: OK",
                    engine.backend_name(),
                    config.backend.endpoint
                ),
                Err(e) => {
                    println!("Backend {}: FAILED ({e})", engine.backend_name());
                    std::process::exit(1);
                }
            }
        }
        Commands::Stats { json } => {
            let (_, engine) = start(cli.config.as_deref()).await?;
            let stats = engine.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                render::print_stats(&stats);
            }
        }
        Commands::Config => print!("{}", Config::default_config_string()),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration and connect the engine.
async fn start(path: Option<&Path>) -> Result<(Config, Engine)> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
        None => Config::load().wrap_err("Failed to load configuration")?,
    };
    let engine = Engine::from_config(&config)
        .await
        .wrap_err("Failed to start the query engine")?;
    Ok((config, engine))
}

/// Explicit identifiers take precedence over free text.
fn query_input(
    text: Vec<String>,
    error_code: Option<String>,
    sku: Option<String>,
    region: Option<String>,
) -> Result<QueryInput> {
    if error_code.is_some() || sku.is_some() || region.is_some() {
        return Ok(QueryInput::Structured(StructuredQuery {
            error_code,
            product_sku: sku,
            region,
        }));
    }
    if text.is_empty() {
        return Err(eyre!("Provide a question or --error-code/--sku/--region"));
    }
    Ok(QueryInput::Text(text.join(" ")))
}
