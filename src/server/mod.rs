use crate::config::Config;
use crate::streaming::{self, GatewayConfig, StreamGateway};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use rangegate_store::RemoteStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod error;
mod request_id;
pub mod routes_media;

pub use error::AppError;
pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub gateway: Arc<StreamGateway>,
}

impl AppContext {
    /// Context serving `store` with the streaming settings from `config`.
    pub fn new(config: Config, store: Arc<dyn RemoteStore>) -> Result<Self> {
        let gateway_config =
            GatewayConfig::new(config.streaming.buffer_size, &config.server.public_base_url)?;
        Ok(Self {
            gateway: Arc::new(StreamGateway::new(store, gateway_config)),
            config: Arc::new(config),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::RANGE, header::CONTENT_TYPE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
            X_REQUEST_ID.clone(),
        ]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/media/stream", streaming::stream_router())
        .nest("/media", routes_media::media_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let store = config
        .store
        .build()
        .context("Failed to initialise object store")?;
    tracing::info!("Using {} store", store.name());

    let ctx = AppContext::new(config, store)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Starting server on {}", addr);
    serve(listener, ctx).await
}

/// Serve on an already bound listener until a shutdown signal arrives.
pub async fn serve(listener: TcpListener, ctx: AppContext) -> Result<()> {
    let app = create_router(ctx);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
