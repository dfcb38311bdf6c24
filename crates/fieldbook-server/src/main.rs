#![forbid(unsafe_code)]

use fieldbook_model::RegionRegistry;
use fieldbook_server::{build_router, validate_startup_config, ApiConfig, AppState};
use fieldbook_store::SqliteStore;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_regions(name: &str) -> RegionRegistry {
    let raw = env::var(name).unwrap_or_default();
    if raw.trim().is_empty() {
        return RegionRegistry::default();
    }
    RegionRegistry::new(raw.split(',').map(str::to_string))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("FIELDBOOK_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("FIELDBOOK_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_path = PathBuf::from(
        env::var("FIELDBOOK_DB_PATH").unwrap_or_else(|_| "fieldbook.sqlite".to_string()),
    );
    let registry = Arc::new(env_regions("FIELDBOOK_REGIONS"));
    let api = ApiConfig {
        max_upload_bytes: env_usize("FIELDBOOK_MAX_UPLOAD_MB", 5) * 1024 * 1024,
        ..ApiConfig::default()
    };
    validate_startup_config(&api, &registry)?;
    info!(regions = ?registry.names(), "region registry loaded");

    let store = Arc::new(
        SqliteStore::open(&db_path)
            .map_err(|e| format!("failed to open store at {}: {e}", db_path.display()))?,
    );
    let state = AppState::new(store, registry, api);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
    info!("fieldbook-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
