use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AnalysisError;
use crate::handlers::Backend;
use crate::models::{AnalysisResult, UploadedImage};

pub struct AppState {
    pub backend: Backend,
    pub max_upload_bytes: usize,
}

pub fn create_router(backend: Backend, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState {
        backend,
        max_upload_bytes,
    });

    Router::new()
        .route("/", get(index_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until the process is stopped.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let backend = Backend::from_config(config)?;
    let app = create_router(backend, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("🌐 NutriSnap listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    let multipart = multipart.map_err(|e| {
        AnalysisError::InvalidInput(format!("Expected a multipart image upload: {}", e))
    })?;

    let image = read_upload(multipart, state.max_upload_bytes).await?;
    let result = state.backend.analyze(image).await?;

    Ok(Json(result))
}

/// Picks the `image` field, or failing that the first field carrying a file.
async fn read_upload(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<Option<UploadedImage>, AnalysisError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, "Malformed upload", max_upload_bytes))?
    {
        let name = field.name().unwrap_or("").to_string();
        let is_file = field.file_name().is_some();
        let mime_type = field.content_type().map(str::to_string);

        if name != "image" && (!is_file || fallback.is_some()) {
            log::warn!("⚠️ Ignoring multipart field: {}", name);
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(e, "Could not read upload", max_upload_bytes))?;
        let image = UploadedImage::new(bytes.to_vec(), mime_type);

        if name == "image" {
            return Ok(Some(image));
        }
        fallback = Some(image);
    }

    Ok(fallback)
}

/// Body-limit hits surface here too, so every rejection stays a JSON 400.
fn upload_error(e: MultipartError, context: &str, max_upload_bytes: usize) -> AnalysisError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        log::warn!("⚠️ Upload over {} bytes rejected", max_upload_bytes);
        return AnalysisError::InvalidInput(format!(
            "Image is too large. The limit is {} bytes.",
            max_upload_bytes
        ));
    }
    AnalysisError::InvalidInput(format!("{}: {}", context, e.body_text()))
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health_check() -> &'static str {
    "OK"
}
