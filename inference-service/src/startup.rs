//! Application wiring and lifecycle.

use crate::config::InferenceConfig;
use crate::handlers;
use crate::models::{LabelSet, RiskMap};
use crate::services::{Classifier, OnnxClassifier, UploadStore};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Request bodies larger than this are rejected before the handler runs.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: InferenceConfig,
    pub labels: Arc<LabelSet>,
    pub risk: Arc<RiskMap>,
    pub classifier: Arc<dyn Classifier>,
    pub uploads: Arc<UploadStore>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Builds the application, loading the ONNX artifact from the configured
    /// path.
    pub async fn build(config: InferenceConfig) -> Result<Self, AppError> {
        let model_path = config.model.path.clone();
        let classifier = tokio::task::spawn_blocking(move || OnnxClassifier::load(&model_path))
            .await
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("model load task failed: {}", e))
            })?
            .map_err(|e| {
                tracing::error!("Failed to load model from {}: {}", config.model.path, e);
                e
            })?;

        tracing::info!(
            model = %config.model.path,
            classes = classifier.output_len(),
            "Classifier ready"
        );

        Self::build_with_classifier(config, Arc::new(classifier)).await
    }

    /// Builds the application around an already constructed classifier, so
    /// tests can drive the full HTTP stack with a mock model.
    pub async fn build_with_classifier(
        config: InferenceConfig,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, AppError> {
        let configured = match &config.model.class_labels {
            Some(raw) => LabelSet::parse_override(raw),
            None => LabelSet::default_labels(),
        };
        let labels = Arc::new(LabelSet::reconcile(configured, classifier.output_len()));

        let uploads = Arc::new(UploadStore::new(&config.uploads.folder).await.map_err(|e| {
            tracing::error!(
                "Failed to initialize upload folder at {}: {}",
                config.uploads.folder,
                e
            );
            e
        })?);

        let state = AppState {
            config: config.clone(),
            labels,
            risk: Arc::new(RiskMap::standard()),
            classifier,
            uploads,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = build_router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/predict", post(handlers::predict))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
