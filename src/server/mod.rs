use crate::config::Config;
use crate::storage::{start_sweep_task, FileStore, Leases, Reaper};
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use docforge_common::Error;
use docforge_convert::{Converter, ToolRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod openapi;
pub mod request_id;
pub mod routes_api;
pub mod routes_files;

use error::AppError;
use request_id::RequestId;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: FileStore,
    pub converter: Converter,
    /// Files in use by in-flight requests
    pub leases: Leases,
    pub reaper: Reaper,
}

impl AppContext {
    pub fn new(config: Config, tools: ToolRegistry) -> Self {
        let leases = Leases::new();
        Self {
            store: FileStore::new(&config.storage),
            converter: Converter::new(Arc::new(tools), config.compression.clone()),
            reaper: Reaper::new(&config.storage, leases.clone()),
            leases,
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        .route("/health", get(routes_api::health))
        .merge(routes_files::file_routes())
        .nest("/api", routes_api::api_routes())
        .merge(openapi::openapi_routes());

    // Serve the front end if a directory is configured
    if let Some(dir) = &ctx.config.server.static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
    }

    app.layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(ctx.config.server.max_upload_bytes()))
        .layer(middleware::from_fn_with_state(ctx.clone(), body_limit_as_json))
        .layer(middleware::from_fn_with_state(ctx.clone(), sweep_after_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(ctx)
}

/// Replace the plain-text 413 of the body limit layer with the JSON error
/// body every other failure uses.
async fn body_limit_as_json(
    State(ctx): State<AppContext>,
    rid: RequestId,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }

    let limit = format!("upload exceeds the {} MB limit", ctx.config.server.max_upload_mb);
    AppError::new(Error::PayloadTooLarge(limit))
        .with_request_id(rid.0)
        .into_response()
}

/// Run the reaper once the response for a request is ready.
async fn sweep_after_request(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let reaper = ctx.reaper.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || reaper.sweep_all()).await {
        tracing::error!("Post-request sweep failed: {}", e);
    }

    response
}

/// Start the HTTP server
pub async fn start_server(config: Config, tools: ToolRegistry) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::new(config, tools);
    ctx.store
        .ensure_dirs()
        .context("Failed to create storage directories")?;

    let sweep_task = match ctx.config.storage.sweep_interval_secs {
        0 => None,
        secs => Some(start_sweep_task(ctx.reaper.clone(), secs)),
    };

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = sweep_task {
        task.abort();
    }

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
