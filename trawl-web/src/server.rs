//! JSON API server for Trawl.
//!
//! Composition root: builds the ledgers, transfer engine, catalog service,
//! and task engine, then serves the HTTP surface over them.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use trawl_catalog::CatalogService;
use trawl_core::config::{ConfigHandle, TrawlConfig};
use trawl_core::ledger::{JsonFileStore, UsageLedger};
use trawl_core::{TaskEngineHandle, TransferEngine, spawn_task_engine};

use crate::handlers::{
    cancel_task, get_config, list_downloads, list_uploads, root_info, scrape, submit_download,
    task_status, update_config, upload, usage_stats,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigHandle,
    pub engine: TaskEngineHandle,
    pub catalog: CatalogService,
    pub transfer: Arc<TransferEngine>,
    pub download_ledger: Arc<UsageLedger>,
    pub upload_ledger: Arc<UsageLedger>,
}

/// Builds the application state from a validated configuration.
///
/// With `demo` set, listings come from deterministic offline data instead
/// of the live catalog site.
///
/// # Errors
/// - `Box<dyn std::error::Error>` - Invalid configuration or catalog client
///   construction failure
pub fn build_state(
    config: TrawlConfig,
    demo: bool,
) -> Result<AppState, Box<dyn std::error::Error>> {
    config.validate()?;

    let catalog = if demo {
        CatalogService::new_demo()
    } else {
        CatalogService::new(&config)?
    };

    let download_ledger = Arc::new(UsageLedger::open(Box::new(JsonFileStore::new(
        config.storage.state_dir.join("download-usage.json"),
    ))));
    let upload_ledger = Arc::new(UsageLedger::open(Box::new(JsonFileStore::new(
        config.storage.state_dir.join("upload-usage.json"),
    ))));

    let transfer = Arc::new(
        TransferEngine::new(&config.network, Arc::new(catalog.clone()))
            .with_temp_suffix(config.storage.temp_file_suffix.clone()),
    );

    let config = ConfigHandle::new(config);
    let engine = spawn_task_engine(config.clone(), transfer.clone(), download_ledger.clone());

    Ok(AppState {
        config,
        engine,
        catalog,
        transfer,
        download_ledger,
        upload_ledger,
    })
}

/// Builds the router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_info))
        .route("/config", get(get_config))
        .route("/config", post(update_config))
        .route("/scrape", get(scrape))
        .route("/download", post(submit_download))
        .route("/tasks/{id}", get(task_status))
        .route("/tasks/{id}/cancel", post(cancel_task))
        .route("/upload", post(upload))
        .route("/usage", get(usage_stats))
        .route("/downloads", get(list_downloads))
        .route("/uploads", get(list_uploads))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the API server until the process is stopped.
///
/// # Errors
/// - `Box<dyn std::error::Error>` - State construction or bind failure
pub async fn run_server(
    config: TrawlConfig,
    host: &str,
    port: u16,
    demo: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config, demo)?;
    let app = router(state);

    let addr = format!("{host}:{port}");
    tracing::info!("Trawl API server running on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
