use crate::config::Config;
use crate::counter_store::MemoryCounterStore;
use crate::directory::{DirectoryStore, MemoryDirectory};
use crate::handlers::{
    health_check, list_organizations, organization_config, search_employees, AppState, SharedState,
};
use crate::middleware::{admission_middleware, logging_middleware};
use crate::rate_limiter::{unix_millis_now, RateLimiter};
use crate::search::SearchEngine;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble shared state from configuration and a directory backend.
pub fn build_state(config: &Config, directory: Arc<dyn DirectoryStore>) -> SharedState {
    let counter_store = Arc::new(MemoryCounterStore::new());
    let limiter = RateLimiter::new(counter_store, config.rate_limit_settings());
    let engine = SearchEngine::new(directory.clone());

    Arc::new(AppState {
        limiter,
        engine,
        directory,
        page_limits: config.page_limits(),
    })
}

/// Build the router: every route except health passes the admission gate.
pub fn create_app(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/organizations", get(list_organizations))
        .route(
            "/api/v1/organizations/:organization_id/config",
            get(organization_config),
        )
        .route(
            "/api/v1/organizations/:organization_id/employees/search",
            get(search_employees),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admission_middleware,
        ))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    config: Config,
    state: SharedState,
}

impl Server {
    /// Create a server, loading the directory data file when configured.
    pub fn new(config: Config) -> crate::error::Result<Self> {
        let directory: Arc<dyn DirectoryStore> = match &config.directory_file {
            Some(path) => {
                let directory = MemoryDirectory::from_json_file(path)?;
                tracing::info!(path = %path.display(), "loaded directory data file");
                Arc::new(directory)
            }
            None => Arc::new(MemoryDirectory::new()),
        };

        let state = build_state(&config, directory);
        Ok(Self { config, state })
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_app(self.state.clone());

        // Counter records older than the largest window are dead weight;
        // prune them periodically so retention stays bounded.
        let limiter = self.state.limiter.clone();
        let interval = Duration::from_secs(self.config.cleanup_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.prune_stale(unix_millis_now()) {
                    Ok(removed) if removed > 0 => {
                        tracing::info!(removed, "pruned stale window counter records");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "counter log pruning failed");
                    }
                }
            }
        });

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!("hr-search server starting on {}", self.config.bind_addr);
        tracing::info!("Health check available at /api/v1/health");

        // Run server with graceful shutdown
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
