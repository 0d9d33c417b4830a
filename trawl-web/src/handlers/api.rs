//! API handlers for configuration, scraping, transfers, and usage.

use std::path::PathBuf;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use trawl_catalog::Listing;
use trawl_core::config::{ConfigUpdate, TrawlConfig};
use trawl_core::ledger::Direction;
use trawl_core::storage::{ContentStore, StoredFile, scan_directory};
use trawl_core::{ContentItem, ContentKind, TaskId, TaskStatus, TransferTask};

use crate::error::ApiError;
use crate::server::AppState;

/// Request body for `POST /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub items: Vec<ContentItem>,
}

/// Response from `POST /download`.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: TaskId,
    pub status: TaskStatus,
}

/// One entry in a `POST /upload` request.
#[derive(Debug, Deserialize)]
pub struct UploadEntry {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(rename = "size")]
    pub size_mb: f64,
}

/// Request body for `POST /upload`.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<UploadEntry>,
}

/// Response from `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<String>,
}

/// Response from `GET /usage`.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub date: chrono::NaiveDate,
    pub downloaded: f64,
    pub uploaded: f64,
    pub download_limit: Option<f64>,
    pub upload_limit: Option<f64>,
    pub download_remaining: Option<f64>,
    pub upload_remaining: Option<f64>,
    pub file_count: u64,
}

/// Response from the directory listing endpoints.
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<StoredFile>,
}

/// `GET /` - service identification.
pub async fn root_info() -> Json<Value> {
    Json(json!({
        "message": "Trawl content acquisition API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /config` - current configuration.
pub async fn get_config(State(state): State<AppState>) -> Json<TrawlConfig> {
    Json(state.config.snapshot())
}

/// `POST /config` - partial configuration update; echoes the merged result.
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<TrawlConfig>, ApiError> {
    let merged = state.config.update(update)?;
    tracing::info!("Configuration updated");
    Ok(Json(merged))
}

/// `GET /scrape` - filtered listings for every configured content kind.
pub async fn scrape(State(state): State<AppState>) -> Json<Listing> {
    let config = state.config.snapshot();
    Json(state.catalog.scrape(&config).await)
}

/// `POST /download` - submit a batch for background download.
pub async fn submit_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let id = state.engine.submit_batch(request.items).await?;
    Ok(Json(SubmitResponse {
        id,
        status: TaskStatus::Pending,
    }))
}

/// `GET /tasks/{id}` - full task snapshot.
pub async fn task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransferTask>, ApiError> {
    let id: TaskId = id
        .parse()
        .map_err(|_| ApiError::not_found("Task not found"))?;
    let task = state.engine.task(id).await?;
    Ok(Json(task))
}

/// `POST /tasks/{id}/cancel` - request cooperative cancellation.
pub async fn cancel_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: TaskId = id
        .parse()
        .map_err(|_| ApiError::not_found("Task not found"))?;
    state.engine.cancel_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /upload` - copy local files into the content store.
///
/// Runs synchronously; each entry is quota-gated and failures are collected
/// per entry rather than failing the request.
pub async fn upload(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Json<UploadResponse> {
    let config = state.config.snapshot();
    let store = ContentStore::new(&config.storage.upload_dir);
    let limit = config.quota.daily_upload_limit_mb;

    let mut success_count = 0;
    let mut errors = Vec::new();

    for entry in &request.files {
        let reservation =
            match state
                .upload_ledger
                .try_reserve(Direction::Upload, entry.size_mb, limit)
            {
                Ok(reservation) => reservation,
                Err(e) => {
                    tracing::warn!("Upload refused: {e}");
                    errors.push(e.to_string());
                    continue;
                }
            };

        match state
            .transfer
            .store_local(&entry.path, entry.kind, &store)
            .await
        {
            Ok(_) => success_count += 1,
            Err(e) => {
                state.upload_ledger.release(reservation);
                tracing::warn!("Upload failed for {}: {e}", entry.path.display());
                errors.push(e.to_string());
            }
        }
    }

    Json(UploadResponse {
        success_count,
        failed_count: request.files.len() - success_count,
        errors,
    })
}

/// `GET /usage` - combined daily usage and remaining quota.
pub async fn usage_stats(State(state): State<AppState>) -> Json<UsageResponse> {
    let config = state.config.snapshot();
    let downloads = state.download_ledger.current_record();
    let uploads = state.upload_ledger.current_record();

    let download_limit = config.quota.daily_download_limit_mb;
    let upload_limit = config.quota.daily_upload_limit_mb;

    Json(UsageResponse {
        date: downloads.date,
        downloaded: downloads.downloaded_mb,
        uploaded: uploads.uploaded_mb,
        download_limit,
        upload_limit,
        download_remaining: download_limit.map(|l| (l - downloads.downloaded_mb).max(0.0)),
        upload_remaining: upload_limit.map(|l| (l - uploads.uploaded_mb).max(0.0)),
        file_count: uploads.file_count,
    })
}

/// `GET /downloads` - scan of the download directory.
///
/// In-flight temp files are excluded from the listing.
pub async fn list_downloads(
    State(state): State<AppState>,
) -> Result<Json<FilesResponse>, ApiError> {
    let config = state.config.snapshot();
    let mut files = scan_directory(&config.storage.download_dir)?;
    files.retain(|f| !f.name.ends_with(&config.storage.temp_file_suffix));
    Ok(Json(FilesResponse { files }))
}

/// `GET /uploads` - scan of the typed content store.
pub async fn list_uploads(State(state): State<AppState>) -> Result<Json<FilesResponse>, ApiError> {
    let config = state.config.snapshot();
    let files = ContentStore::new(&config.storage.upload_dir).list()?;
    Ok(Json(FilesResponse { files }))
}
