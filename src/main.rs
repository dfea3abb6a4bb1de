//! bookmend - book metadata updater
//!
//! Reconciles a Google Sheets library list against Google Books and
//! Open Library, filling in only the cells that are currently empty.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use bookmend::config::{resolve_sheets_token, Config};
use bookmend::services::{GoogleBooksClient, MetadataPipeline, OpenLibraryClient, RateLimiter};
use bookmend::store::GoogleSheetsStore;
use bookmend::types::MetadataSource;
use bookmend::utils::connectivity::check_internet_connection;
use bookmend::utils::http_retry::RetryPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "bookmend",
    version,
    about = "Fill empty book metadata cells in a Google Sheets library list"
)]
struct Args {
    /// Configuration file path
    #[arg(long, default_value = "bookmend.toml")]
    config: PathBuf,

    /// Spreadsheet ID (overrides config)
    #[arg(long)]
    spreadsheet_id: Option<String>,

    /// Worksheet name (overrides config)
    #[arg(long)]
    sheet: Option<String>,

    /// Simulate updates without writing to the sheet
    #[arg(long)]
    dry_run: bool,

    /// Only validate the sheet structure, then exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_existed = args.config.exists();
    let mut config = Config::load(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting bookmend v{}", env!("CARGO_PKG_VERSION"));
    if !config_existed {
        info!("Created default config file: {}", args.config.display());
    }

    if let Some(spreadsheet_id) = args.spreadsheet_id {
        config.spreadsheet_id = spreadsheet_id;
    }
    if let Some(sheet) = args.sheet {
        config.sheet_name = sheet;
    }
    if config.spreadsheet_id.is_empty() {
        error!("No spreadsheet configured");
        anyhow::bail!(
            "spreadsheet_id is not configured; set it in {} or pass --spreadsheet-id",
            args.config.display()
        );
    }

    if !check_internet_connection().await {
        error!("No internet connection available");
        return Err(bookmend::Error::Connectivity.into());
    }

    let token = resolve_sheets_token(&config)?;
    let retry = RetryPolicy {
        attempts: config.retry_attempts,
        backoff_factor: config.backoff_factor,
    };

    let store = GoogleSheetsStore::new(
        config.spreadsheet_id.clone(),
        config.sheet_name.clone(),
        token,
        retry,
    )?;

    let rate_limiter = Arc::new(RateLimiter::new(Duration::from_millis(
        config.rate_limit_delay_ms,
    )));
    let sources: Vec<Arc<dyn MetadataSource>> = vec![
        Arc::new(GoogleBooksClient::new(Arc::clone(&rate_limiter), retry)?),
        Arc::new(OpenLibraryClient::new(Arc::clone(&rate_limiter), retry)?),
    ];

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received: in-flight work will finish, no further batches will start");
                cancel.cancel();
            }
        });
    }

    let dry_run = args.dry_run;
    if dry_run {
        info!("Dry-run mode: no cells will be written");
    }

    let pipeline = MetadataPipeline::new(config, sources, dry_run, cancel)?;

    if args.validate {
        let missing = pipeline.validate_structure(&store).await?;
        if missing.is_empty() {
            info!("Sheet structure validation passed");
            return Ok(());
        }
        error!("Missing required columns in sheet: {:?}", missing);
        anyhow::bail!("sheet structure validation failed");
    }

    let summary = pipeline.run(&store).await?;
    info!("Done. {}", summary);

    Ok(())
}
