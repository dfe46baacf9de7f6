//! Application startup and lifecycle management.
//!
//! Wires the trigger table, document loader and chat backend into the
//! router and runs the HTTP server until a shutdown signal arrives.

use crate::config::AskConfig;
use crate::error::AskError;
use crate::handlers;
use crate::models::GenerationConfig;
use crate::services::providers::gemini::{GeminiChatBackend, GeminiConfig};
use crate::services::providers::ChatBackend;
use crate::services::{AnswerService, DocumentLoader, FileDocumentLoader, TriggerTable};
use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, request_id_middleware, security_headers_middleware,
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Shared application state. Everything in here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub triggers: Arc<TriggerTable>,
    pub documents: Arc<dyn DocumentLoader>,
    pub answers: AnswerService,
}

impl AppState {
    pub fn new(
        triggers: TriggerTable,
        documents: Arc<dyn DocumentLoader>,
        answers: AnswerService,
    ) -> Self {
        Self {
            triggers: Arc::new(triggers),
            documents,
            answers,
        }
    }
}

/// Turn a handler panic into the generic 500 envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "non-string panic payload".to_string());

    AskError::Unknown(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Build the HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/ask",
            post(handlers::ask).fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the Gemini backend from `config`.
    pub async fn build(config: AskConfig) -> Result<Self, AppError> {
        let backend = GeminiChatBackend::new(GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.models.chat_model.clone(),
            api_base: config.google.api_base.clone(),
            timeout: config.google.timeout,
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        if config.uses_sentinel_api_key() {
            tracing::warn!("GOOGLE_API_KEY is not set; backend calls will fail authentication");
        }
        tracing::info!(
            model = %config.models.chat_model,
            max_output_tokens = config.models.max_output_tokens,
            "Initialized Gemini chat backend"
        );

        Self::build_with_backend(config, Arc::new(backend)).await
    }

    /// Build the application around an arbitrary chat backend.
    pub async fn build_with_backend(
        config: AskConfig,
        backend: Arc<dyn ChatBackend>,
    ) -> Result<Self, AppError> {
        let triggers = TriggerTable::load(config.triggers.file.as_deref()).map_err(|e| {
            tracing::error!("Failed to load trigger table: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;
        tracing::info!(entries = triggers.len(), "Trigger table ready");

        let documents: Arc<dyn DocumentLoader> =
            Arc::new(FileDocumentLoader::new(config.document.path.clone()));
        tracing::info!(path = %config.document.path.display(), "Context document source");

        let answers = AnswerService::new(
            backend,
            GenerationConfig {
                max_output_tokens: config.models.max_output_tokens,
            },
        );

        let state = AppState::new(triggers, documents, answers);

        // Port 0 picks a random port, which tests rely on.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Ask service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
