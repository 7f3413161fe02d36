use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use stockcheck_core::{BatchRequest, BatchResponse, StockQuery};
use stockcheck_scraper::StockChecker;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stockcheck-cli")]
#[command(about = "Check product stock on the storefront from the command line")]
struct Cli {
    /// Skip the rendering proxy even when an API key is configured
    #[arg(long, global = true)]
    direct: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a single product; `--sku` wins when both are given
    Check {
        #[arg(long)]
        sku: Option<String>,

        #[arg(long)]
        code: Option<String>,
    },
    /// Run a JSON batch file shaped like `{"items":[{"brand":..,"sku":..}]}`
    Batch {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = stockcheck_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut checker = StockChecker::from_app_config(&config)?;
    if cli.direct {
        checker = checker.with_prefer_proxy(false);
    }

    let output = match cli.command {
        Commands::Check { sku, code } => {
            let query = query_from_args(sku.as_deref(), code.as_deref())?;
            serde_json::to_string_pretty(&checker.check(&query).await)?
        }
        Commands::Batch { file } => {
            let request = read_batch_file(&file).await?;
            let results = checker.check_batch(request.items).await;
            let failed = results.iter().filter(|r| !r.result.ok).count();
            tracing::info!(count = results.len(), failed, "batch finished");
            serde_json::to_string_pretty(&BatchResponse::from(results))?
        }
    };

    println!("{output}");
    Ok(())
}

fn query_from_args(sku: Option<&str>, code: Option<&str>) -> anyhow::Result<StockQuery> {
    StockQuery::from_parts(sku, code).context("either --sku or --code is required")
}

async fn read_batch_file(path: &Path) -> anyhow::Result<BatchRequest> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("batch file {} is not a valid batch request", path.display()))
}
