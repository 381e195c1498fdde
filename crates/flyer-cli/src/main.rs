//! Bulk flyer generation executable
//!
//! `flyer bulk` resolves a SKU list against the catalog, generates one
//! flyer PDF per SKU, and delivers either a merged PDF or a ZIP archive.
//! `flyer single` turns one already-resolved product payload into one PDF.

use clap::{Arg, ArgAction, Command};
use flyer_core::bulk::{
    aggregate, BulkOrchestrator, CatalogFetcher, LogProgress, DEFAULT_JOB_CONCURRENCY,
};
use flyer_core::clients::{CatalogClient, CompilerService};
use flyer_core::constants::{flyer_entry_name, MERGED_FILE_NAME};
use flyer_core::services::{FlyerGenerator, HtmlFlyerRenderer};
use flyer_core::FlyerConfig;
use flyer_types::{OutputMode, RunResult, Sku};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("flyer")
        .version("1.0.0")
        .about("Bulk product flyer generator")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config/flyer.json")
                .global(true),
        )
        .subcommand(
            Command::new("bulk")
                .about("Generate flyers for a list of SKUs")
                .arg(
                    Arg::new("skus")
                        .long("skus")
                        .value_name("LIST")
                        .help("Comma- or newline-separated SKU list"),
                )
                .arg(
                    Arg::new("skus-file")
                        .long("skus-file")
                        .value_name("FILE")
                        .help("File containing the SKU list, one per line or comma-separated")
                        .conflicts_with("skus"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_name("MODE")
                        .help("Output mode: merged (one PDF) or archive (ZIP)")
                        .value_parser(["merged", "archive"])
                        .default_value("merged"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("Output file path (defaults per mode)"),
                )
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .value_name("N")
                        .help("Simultaneous generation jobs")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("single")
                .about("Generate one flyer from a resolved product JSON payload")
                .arg(
                    Arg::new("payload")
                        .long("payload")
                        .value_name("FILE")
                        .help("JSON file with one resolved product record")
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("Output PDF path")
                        .default_value("flyer.pdf"),
                )
                .arg(
                    Arg::new("skip-compile")
                        .long("skip-compile")
                        .help("Write the rendered HTML instead of compiling a PDF")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = FlyerConfig::from_file(config_path)?;
    log::info!("Loaded configuration from {}", config_path);

    match matches.subcommand() {
        Some(("bulk", sub)) => run_bulk(&config, sub).await,
        Some(("single", sub)) => run_single(&config, sub).await,
        _ => unreachable!("subcommand is required"),
    }
}

async fn run_bulk(
    config: &FlyerConfig,
    matches: &clap::ArgMatches,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let skus = load_skus(matches)?;
    if skus.is_empty() {
        return Err("no SKUs provided; use --skus or --skus-file".into());
    }
    log::info!("Generating flyers for {} SKUs", skus.len());

    let mode = match matches.get_one::<String>("mode").unwrap().as_str() {
        "archive" => OutputMode::Archive,
        _ => OutputMode::Merged,
    };
    let concurrency = matches
        .get_one::<usize>("concurrency")
        .copied()
        .unwrap_or(DEFAULT_JOB_CONCURRENCY);
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(mode));

    let catalog_client = CatalogClient::new(
        config.catalog.clone(),
        Duration::from_secs(config.fetch.timeout_secs),
    )?;
    let fetcher = CatalogFetcher::new(Arc::new(catalog_client), config.fetch.clone());

    let compiler = CompilerService::new(config.compiler.clone())?;
    if !compiler.health_check().await.unwrap_or(false) {
        log::warn!("Compiler service health check failed, proceeding anyway");
    }

    let generator = Arc::new(FlyerGenerator::new(
        Arc::new(HtmlFlyerRenderer),
        Arc::new(compiler),
        config.content.clone(),
    ));

    let orchestrator = BulkOrchestrator::new(fetcher, generator);
    let run = orchestrator.run(&skus, concurrency, &LogProgress).await?;

    for (sku, reason) in &run.failed {
        log::warn!("SKU {} failed: {}", sku, reason);
    }

    if run.succeeded.is_empty() {
        return Err(format!("all {} SKUs failed, nothing to write", skus.len()).into());
    }

    match aggregate(mode, &skus, &run.succeeded) {
        Ok(bytes) => {
            std::fs::write(&output, bytes)?;
            log::info!(
                "Wrote {} ({} flyers, {} failures)",
                output.display(),
                run.succeeded.len(),
                run.failed.len()
            );
            Ok(())
        }
        Err(e) => {
            // The per-SKU PDFs are still intact; save them individually
            // so the run's work is not lost.
            log::error!("Aggregation failed: {}", e);
            let dir = output.parent().unwrap_or_else(|| Path::new("."));
            write_individual_flyers(dir, &run)?;
            Err(e.into())
        }
    }
}

async fn run_single(
    config: &FlyerConfig,
    matches: &clap::ArgMatches,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let payload_path = matches.get_one::<String>("payload").unwrap();
    let output = PathBuf::from(matches.get_one::<String>("output").unwrap());

    let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(payload_path)?)?;

    let compiler = CompilerService::new(config.compiler.clone())?;
    let generator = FlyerGenerator::new(
        Arc::new(HtmlFlyerRenderer),
        Arc::new(compiler),
        config.content.clone(),
    );

    if matches.get_flag("skip-compile") {
        let html = generator.render_from_payload(&payload)?;
        std::fs::write(&output, html)?;
        log::info!("Wrote rendered HTML to {}", output.display());
        return Ok(());
    }

    let pdf = generator.generate_from_payload(&payload).await?;
    std::fs::write(&output, &pdf)?;
    log::info!("Wrote {} ({} bytes)", output.display(), pdf.len());
    Ok(())
}

fn default_output(mode: OutputMode) -> PathBuf {
    match mode {
        OutputMode::Merged => PathBuf::from(MERGED_FILE_NAME),
        OutputMode::Archive => PathBuf::from("flyers.zip"),
    }
}

/// Parse a SKU list: commas and line breaks both separate, blanks are
/// dropped, duplicates keep their first position.
fn parse_skus(raw: &str) -> Vec<Sku> {
    let mut seen = std::collections::HashSet::new();
    raw.split(|c| c == ',' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

fn load_skus(
    matches: &clap::ArgMatches,
) -> Result<Vec<Sku>, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(raw) = matches.get_one::<String>("skus") {
        return Ok(parse_skus(raw));
    }
    if let Some(path) = matches.get_one::<String>("skus-file") {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read SKU file {}: {}", path, e))?;
        return Ok(parse_skus(&content));
    }
    Ok(Vec::new())
}

fn write_individual_flyers(
    dir: &Path,
    run: &RunResult,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for (sku, pdf) in &run.succeeded {
        let path = dir.join(flyer_entry_name(sku));
        std::fs::write(&path, pdf)?;
        log::info!("Saved {}", path.display());
    }
    Ok(())
}
