//! Web layer module
//!
//! This module provides the HTTP interface for the catalog relay. Handlers
//! are thin and delegate to the relay and aggregator services.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers organized by domain
//! - **Responses**: Standardized response types and error handling
//! - **Extractors**: Query-string parameter types
//! - **Middleware**: Request logging, security headers and panic handling

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};
use tracing::{info, warn};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    proxy::ProxyRelay,
    services::CatalogAggregator,
    sources::SourceRegistry,
    utils::{FetchOptions, RetryingFetcher, SharedSecrets, UrlSafetyGate},
};

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;

// Re-export commonly used types
pub use responses::{ApiResponse, handle_error};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub aggregator: Arc<CatalogAggregator>,
    pub relay: Arc<ProxyRelay>,
    pub secrets: Arc<SharedSecrets>,
    /// Application start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Wire the services from a validated configuration
    pub fn from_config(config: Config) -> AppResult<Self> {
        let registry = Arc::new(SourceRegistry::from_config(&config.sources)?);
        let options = FetchOptions::from(&config.relay);
        let gate = UrlSafetyGate::from_config(&config.relay);

        // Relay redirects are re-checked against the gate on every hop
        let relay_fetcher = RetryingFetcher::with_redirect_gate(options.clone(), gate.clone())?;
        let relay = ProxyRelay::new(relay_fetcher, gate, &config.relay);
        let catalog_fetcher = RetryingFetcher::new(options)?;
        let aggregator = CatalogAggregator::new(registry, catalog_fetcher, config.catalog.clone());
        let secrets = SharedSecrets::from_config(&config.auth);

        if secrets.password_required() {
            info!("Relay requests require the password digest");
        }

        Ok(Self {
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
            relay: Arc::new(relay),
            secrets: Arc::new(secrets),
            start_time: Instant::now(),
        })
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    config.web.host, config.web.port
                )
            })?;
        let state = AppState::from_config(config)?;
        let app = Self::create_router(state)?;

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> AppResult<Router> {
        let cors = Self::cors_layer(&state.config.web.cors_origin)?;

        Ok(Router::new()
            // Health check endpoint
            .route("/health", get(handlers::health::health_check))
            // Pages with password placeholders
            .route("/", get(handlers::pages::index))
            .route("/index.html", get(handlers::pages::index))
            .route("/player.html", get(handlers::pages::player))
            // Relay
            .route("/proxy/{*target}", get(handlers::relay::relay))
            // Catalog API
            .nest("/api", Self::api_routes())
            // Search links and static assets
            .fallback(handlers::pages::fallback)
            // Middleware (applied in reverse order)
            .layer(cors)
            .layer(axum::middleware::from_fn(
                middleware::security_headers_middleware,
            ))
            .layer(CatchPanicLayer::custom(middleware::panic_response))
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .with_state(state))
    }

    fn api_routes() -> Router<AppState> {
        Router::new()
            .route("/recommendations", get(handlers::catalog::recommendations))
            .route("/search", get(handlers::catalog::search))
            .route("/movie/{id}", get(handlers::catalog::movie_detail))
            .route("/sources", get(handlers::catalog::list_sources))
            .route("/categories", get(handlers::catalog::list_categories))
            .route("/category/{type}", get(handlers::catalog::category_listing))
    }

    fn cors_layer(origin: &str) -> AppResult<CorsLayer> {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);
        if origin.trim() == "*" {
            return Ok(layer.allow_origin(Any));
        }
        let origin = HeaderValue::from_str(origin.trim())
            .map_err(|e| AppError::configuration(format!("Invalid CORS origin '{origin}': {e}")))?;
        Ok(layer.allow_origin(origin))
    }

    /// Start the web server and run until SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("Failed to bind to {}", self.addr))?;
        info!("Listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Web server stopped");
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
