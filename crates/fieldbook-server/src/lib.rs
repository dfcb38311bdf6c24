#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "fieldbook-server";

mod config;
mod errors;
mod http;

pub use config::{validate_startup_config, ApiConfig, CONFIG_SCHEMA_VERSION};
pub use errors::{ApiError, ApiErrorCode};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use fieldbook_model::RegionRegistry;
use fieldbook_store::SqliteStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub registry: Arc<RegionRegistry>,
    pub api: ApiConfig,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, registry: Arc<RegionRegistry>, api: ApiConfig) -> Self {
        Self {
            store,
            registry,
            api,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.api.max_upload_bytes;
    Router::new()
        .route("/healthz", get(http::healthz_handler))
        .route("/v1/regions", get(http::regions_handler))
        .route("/v1/uploads", post(http::upload_handler))
        .route("/v1/records", get(http::records_handler))
        .route("/v1/records/{id}", get(http::record_handler))
        .route("/v1/records/{id}/visit", patch(http::record_visit_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
