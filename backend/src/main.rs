//! Main entry point for the table menu ordering service.
//!
//! This file initializes logging, loads configuration, connects the menu
//! backend adapter, loads the catalog, and serves the API until a shutdown
//! signal arrives.

mod api;
mod config;
mod errors;
mod middleware;
mod services;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use menu_adapters::{InMemoryAdapter, MenuAdapter, SupabaseAdapter};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, signal::ctrl_c, time::interval};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};

use api::SharedState;
use config::{BackendConfig, Config, DisplayTables};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!("Server failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Loading configuration...");
    let config = Config::load()?;
    let tables = DisplayTables::load(config.category_table.as_deref())?;
    let adapter = build_adapter(&config.backend).await?;

    info!("Initializing state...");
    let state = api::AppState::new(config, adapter, tables).await;
    spawn_session_sweeper(Arc::clone(&state));

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn build_adapter(backend: &BackendConfig) -> Result<Arc<dyn MenuAdapter>, Box<dyn Error + Send + Sync>> {
    let adapter: Arc<dyn MenuAdapter> = match backend {
        BackendConfig::Supabase(supabase) => {
            info!(url = %supabase.url, "Using Supabase backend");
            Arc::new(SupabaseAdapter::new(supabase.clone())?)
        }
        BackendConfig::Memory { seed_file: Some(path) } => {
            info!(seed = %path.display(), "Using in-memory backend");
            Arc::new(InMemoryAdapter::from_seed_file(path).await?)
        }
        BackendConfig::Memory { seed_file: None } => {
            info!("Using empty in-memory backend");
            Arc::new(InMemoryAdapter::default())
        }
    };
    Ok(adapter)
}

fn spawn_session_sweeper(state: SharedState) {
    let period = state.sessions.idle_timeout() / 4;
    tokio::spawn(async move {
        let mut ticker = interval(period.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let evicted = state.sessions.evict_idle(Instant::now()).await;
            if evicted > 0 {
                let remaining = state.sessions.len().await;
                debug!(evicted, remaining, "Evicted idle sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
