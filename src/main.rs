pub mod config;
pub mod diagnosis;
pub mod error;
pub mod gemini;
pub mod health;
pub mod media_ingestion;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, MODEL_NAME};
use crate::diagnosis::ImageDiagnosisService;
use crate::gemini::GeminiClient;
use crate::health::health_check;
use crate::media_ingestion::{MAX_IMAGE_SIZE, handle_image_upload};

#[derive(Clone)]
pub struct AppState {
    pub diagnosis_service: Arc<ImageDiagnosisService>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(handle_image_upload))
        // Leave headroom so oversize images reach the service's own size check.
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE * 2))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plant_diagnosis=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let gemini_client = GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_base_url,
        MODEL_NAME,
        config.gemini_timeout,
    )?;
    let diagnosis_service = ImageDiagnosisService::new(Arc::new(gemini_client), config.profile.clone())?;

    tracing::info!(
        "Diagnosis service ready (model: {}, language: {}, strict schema: {})",
        diagnosis_service.model_name(),
        diagnosis_service.profile().language,
        diagnosis_service.profile().strict_schema
    );

    let state = AppState {
        diagnosis_service: Arc::new(diagnosis_service),
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::DiagnosisProfile;
    use crate::error::GENERIC_FAILURE_MESSAGE;
    use crate::gemini::testing::FakeModel;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "plant-boundary";

    fn state_with(model: Arc<FakeModel>) -> AppState {
        let service = ImageDiagnosisService::new(model, DiagnosisProfile::structured()).unwrap();
        AppState {
            diagnosis_service: Arc::new(service),
        }
    }

    fn multipart_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(state_with(Arc::new(FakeModel::replying(""))));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "fake-model");
    }

    #[tokio::test]
    async fn test_analyze_returns_diagnosis() {
        let model = Arc::new(FakeModel::replying(
            "```json\n{\"diseaseName\":\"X\",\"severity\":\"Low\",\"treatmentAdvice\":\"Y\",\"confidenceScore\":0.8}\n```",
        ));
        let app = app(state_with(model.clone()));

        let response = app
            .oneshot(multipart_request("file", "leaf.png", "application/octet-stream", b"\x89PNG"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "diseaseName": "X",
                "severity": "Low",
                "treatmentAdvice": "Y",
                "confidenceScore": 0.8
            })
        );
        assert_eq!(model.last_request().unwrap().image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_image_field_name_is_accepted() {
        let model = Arc::new(FakeModel::replying(
            r#"{"diseaseName":"X","severity":"None","treatmentAdvice":"Y","confidenceScore":1.0}"#,
        ));
        let response = app(state_with(model))
            .oneshot(multipart_request("image", "leaf.jpg", "image/jpeg", b"jpeg"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_type_is_server_error_with_reason() {
        let model = Arc::new(FakeModel::replying(""));
        let response = app(state_with(model.clone()))
            .oneshot(multipart_request("file", "notes.txt", "text/plain", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid file type: text/plain"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_image_is_server_error_with_reason() {
        let model = Arc::new(FakeModel::replying(""));
        let data = vec![0u8; MAX_IMAGE_SIZE + 1];
        let response = app(state_with(model.clone()))
            .oneshot(multipart_request("file", "leaf.png", "image/png", &data))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("too large"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let model = Arc::new(FakeModel::replying(""));
        let data = vec![0u8; MAX_IMAGE_SIZE * 2 + 1024];
        let response = app(state_with(model.clone()))
            .oneshot(multipart_request("file", "leaf.png", "image/png", &data))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_plain_field_is_not_an_upload() {
        let model = Arc::new(FakeModel::replying(""));
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nleaf.png\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();

        let response = app(state_with(model.clone())).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No file provided");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let model = Arc::new(FakeModel::replying(""));
        let response = app(state_with(model))
            .oneshot(multipart_request("notes", "notes.png", "image/png", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_model_failures_are_generic() {
        for model in [
            FakeModel::failing("Gemini error 401: API key not valid"),
            FakeModel::replying("not-json-at-all"),
            FakeModel::replying("```json\n```"),
        ] {
            let response = app(state_with(Arc::new(model)))
                .oneshot(multipart_request("file", "leaf.png", "image/png", b"png"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = json_body(response).await;
            assert_eq!(body, serde_json::json!({ "error": GENERIC_FAILURE_MESSAGE }));
        }
    }
}
