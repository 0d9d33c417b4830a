//! CLI command implementations

use anyhow::Context;
use clap::Subcommand;

use trawl_catalog::CatalogService;
use trawl_core::config::TrawlConfig;
use trawl_core::ledger::{JsonFileStore, UsageLedger};
use trawl_core::{ContentKind, TimeWindow};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// Use offline demo listings instead of the live catalog
        #[arg(long)]
        demo: bool,
    },
    /// Fetch and print a catalog listing
    Scrape {
        /// Content kind to list (videos, images, files); all when omitted
        #[arg(short, long)]
        kind: Option<ContentKind>,
        /// Recency window (24h, 7d, 30d, all)
        #[arg(short, long)]
        window: Option<TimeWindow>,
        /// Use offline demo listings instead of the live catalog
        #[arg(long)]
        demo: bool,
    },
    /// Print today's usage against the configured quotas
    Usage,
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port, demo } => serve(host, port, demo).await,
        Commands::Scrape { kind, window, demo } => scrape(kind, window, demo).await,
        Commands::Usage => usage().await,
    }
}

/// Start the API server over the environment-derived configuration.
async fn serve(host: String, port: u16, demo: bool) -> anyhow::Result<()> {
    let config = TrawlConfig::from_env();
    trawl_web::run_server(config, &host, port, demo)
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {e}"))
}

/// Fetch listings once and print them.
async fn scrape(
    kind: Option<ContentKind>,
    window: Option<TimeWindow>,
    demo: bool,
) -> anyhow::Result<()> {
    let mut config = TrawlConfig::from_env();
    if let Some(window) = window {
        config.filter.time_window = window;
    }
    if let Some(kind) = kind {
        config.filter.content_kinds = vec![kind];
    }

    let catalog = if demo {
        CatalogService::new_demo()
    } else {
        CatalogService::new(&config).context("Failed to build catalog client")?
    };

    let listing = catalog.scrape(&config).await;

    for (kind, items) in [
        (ContentKind::Video, &listing.videos),
        (ContentKind::Image, &listing.images),
        (ContentKind::File, &listing.files),
    ] {
        if !config.filter.content_kinds.contains(&kind) {
            continue;
        }
        println!("Found {} {kind}", items.len());
        for item in items.iter().take(10) {
            println!("  - {} ({})", item.name, item.size_text);
        }
    }

    Ok(())
}

/// Print today's usage record and remaining quota.
async fn usage() -> anyhow::Result<()> {
    let config = TrawlConfig::from_env();
    let state_dir = &config.storage.state_dir;

    let downloads = UsageLedger::open(Box::new(JsonFileStore::new(
        state_dir.join("download-usage.json"),
    )))
    .current_record();
    let uploads = UsageLedger::open(Box::new(JsonFileStore::new(
        state_dir.join("upload-usage.json"),
    )))
    .current_record();

    println!("Usage for {}", downloads.date);
    print_line(
        "Downloaded",
        downloads.downloaded_mb,
        config.quota.daily_download_limit_mb,
    );
    print_line(
        "Uploaded",
        uploads.uploaded_mb,
        config.quota.daily_upload_limit_mb,
    );
    println!("  Files uploaded: {}", uploads.file_count);

    Ok(())
}

fn print_line(label: &str, used_mb: f64, limit_mb: Option<f64>) {
    match limit_mb {
        Some(limit) => println!(
            "  {label}: {used_mb:.1} MB of {limit:.1} MB ({:.1} MB remaining)",
            (limit - used_mb).max(0.0)
        ),
        None => println!("  {label}: {used_mb:.1} MB (no limit)"),
    }
}
