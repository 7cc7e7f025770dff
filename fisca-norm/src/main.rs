//! fisca-norm - payload normalization CLI
//!
//! Reads a raw OpenFisca calculation payload (file or stdin), normalizes
//! it, and prints the normalized payload plus the reclassification report
//! as JSON. With `--calculate` the normalized payload is also submitted to
//! the calculation service and the result included in the output.

use anyhow::Result;
use clap::Parser;
use fisca_common::config::ServiceConfig;
use fisca_norm::services::{CalculationClient, HttpMetadataAuthority, MetadataService, SystemClock};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "fisca-norm",
    about = "Normalize an OpenFisca calculation payload"
)]
struct Args {
    /// Payload JSON file ("-" reads stdin)
    input: PathBuf,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Strict mode: fail on unresolved placements or metadata fetch errors
    #[arg(long)]
    debug: bool,

    /// Submit the normalized payload to the calculation service
    #[arg(long)]
    calculate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServiceConfig::load(args.config.as_deref())?;
    let debug_mode = args.debug || config.debug_mode;

    let raw = if args.input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)?
    };
    let mut payload: Value = serde_json::from_str(&raw)?;

    let authority = Arc::new(HttpMetadataAuthority::new(&config.metadata_base_url)?);
    let metadata =
        MetadataService::with_ttl_and_clock(authority, config.cache_ttl, Arc::new(SystemClock));

    info!(metadata_authority = %config.metadata_base_url, debug_mode, "Normalizing payload");
    let report = fisca_norm::normalize_payload(&mut payload, &metadata, debug_mode).await?;

    let result = if args.calculate {
        let client = CalculationClient::new(&config.calculation_url)?;
        Some(client.calculate(&payload).await?)
    } else {
        None
    };

    let mut output = serde_json::json!({
        "payload": payload,
        "report": report,
    });
    if let Some(result) = result {
        output["result"] = result;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
