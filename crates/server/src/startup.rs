use std::net::SocketAddr;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use common::env::ensure_parent_dir;
use configs::{AppConfig, BackendKind};
use service::kv::build_backend;

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured bucket backend and wrap it as handler state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    if cfg.store.backend == BackendKind::File {
        ensure_parent_dir(&cfg.store.file_path).await?;
    }
    let kv = build_backend(&cfg.store).await?;
    Ok(AppState::new(kv))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Public entry: load config, build the app and serve until the task ends.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_default()?;

    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, backend = ?cfg.store.backend, "data endpoint listening");
    axum::serve(listener, app).await?;
    Ok(())
}
