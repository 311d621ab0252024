use anyhow::{Context, Result};
use clap::Parser;
use funder_insight::core::config::AppConfig;
use funder_insight::features::{SummaryGenerator, enrich_funders};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// Research funders on the web and print AI summaries as JSON.
#[derive(Debug, Parser)]
#[command(name = "funder-research")]
struct Args {
    /// Organization names to summarize.
    names: Vec<String>,

    /// JSON file holding an array of funder records to enrich.
    #[arg(long)]
    funders: Option<PathBuf>,

    /// Organizations researched at once; overrides SUMMARY_CONCURRENCY.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    funder_insight::setup_logging();

    let args = Args::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let concurrency = args.concurrency.unwrap_or(config.summary_concurrency);
    let generator = SummaryGenerator::new(&config).context("Failed to build summary pipeline")?;

    if let Some(path) = args.funders {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut funders: Vec<Value> =
            serde_json::from_str(&raw).context("Funder file must hold a JSON array")?;
        enrich_funders(&generator, &mut funders, concurrency).await;
        println!("{}", serde_json::to_string_pretty(&funders)?);
        return Ok(());
    }

    for name in &args.names {
        info!("Summarizing {}", name);
        let outcome = generator.summarize(name).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}
