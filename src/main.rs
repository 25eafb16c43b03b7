// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::asset_cache_router::AssetCacheRouter;
use crate::application::icon_service::IconService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_network::HttpNetwork;
use crate::infrastructure::memory_cache::InMemoryCacheStorage;
use crate::infrastructure::sun_table_loader::load_sun_table;
use crate::infrastructure::svg_surface::SvgSurfaceFactory;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    cache_summary, fetch_url, health_check, intercept_origin, render_icon, render_icon_type,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;

    // Sun times are populated once, before anything renders
    let sun_times = Arc::new(load_sun_table(&config.sun)?);

    // Create adapters (infrastructure layer)
    let storage = Arc::new(InMemoryCacheStorage::with_max_entries(config.cache.max_entries));
    let network = Arc::new(HttpNetwork::new()?);

    // Create services (application layer)
    let router = AssetCacheRouter::new(
        storage,
        network,
        config.cache.cache_name(),
        config.cache.manifest()?,
        config.cache.live_hosts.clone(),
    )
    .allow_host(config.cache.origin_host()?);
    let icon_service = IconService::new(sun_times, Arc::new(SvgSurfaceFactory));

    // Install, then take over immediately
    match router.install().await {
        Ok(()) => {
            router.activate().await?;
        }
        Err(e) => {
            tracing::warn!(
                "Serving without a pre-cached generation ({}); assets will be cached on first use",
                e
            );
        }
    }

    // Create application state
    let state = Arc::new(AppState {
        router,
        icon_service,
        cache_settings: config.cache.clone(),
    });

    // Build router (presentation layer)
    let app = Router::new()
        .route("/healthz", get(health_check))
        .route("/icons/:code", get(render_icon))
        .route("/icons/type/:icon_type", get(render_icon_type))
        .route("/cache", get(cache_summary))
        .route("/fetch", get(fetch_url))
        .fallback(intercept_origin)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting vejr-edge on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
