//! HTTP handlers for the JSON API.

mod api;

pub use api::{
    cancel_task, get_config, list_downloads, list_uploads, root_info, scrape, submit_download,
    task_status, update_config, upload, usage_stats,
};
