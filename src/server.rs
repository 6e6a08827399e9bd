use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::handlers::AnalysisHandler;
use crate::models::AnalysisResponse;

pub struct AppState {
    pub analysis_handler: Arc<AnalysisHandler>,
}

/// Fields accepted by `POST /analyze`.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Vec<u8>>,
    notes: String,
}

pub fn create_router(analysis_handler: Arc<AnalysisHandler>, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { analysis_handler });

    Router::new()
        .route("/", get(root_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                // Mirrors origin, method and headers so credentials can be allowed for any caller
                .layer(CorsLayer::very_permissive())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

/// Always answers 200; failures are reported in the `error` field.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<AnalysisResponse> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            log::warn!("⚠️ Rejected analyze request: {}", rejection.body_text());
            return Json(AnalysisResponse::Error(rejection.body_text()));
        }
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("⚠️ Failed to read upload: {:#}", e);
            return Json(AnalysisResponse::Error(format!("{:#}", e)));
        }
    };

    let Some(file) = form.file else {
        log::warn!("⚠️ Analyze request without a file field");
        return Json(AnalysisResponse::Error(
            "Missing required form field: file".to_string(),
        ));
    };

    Json(state.analysis_handler.analyze(file, &form.notes).await)
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .context("Failed to read multipart body")?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.context("Failed to read uploaded file")?;
                form.file = Some(bytes.to_vec());
            }
            "notes" => {
                form.notes = field.text().await.context("Failed to read notes field")?;
            }
            other => {
                log::debug!("Ignoring unknown form field: {}", other);
            }
        }
    }

    Ok(form)
}

async fn root_handler() -> &'static str {
    "Nutrition Lens - POST a food photo to /analyze"
}

async fn health_check() -> &'static str {
    "OK"
}
