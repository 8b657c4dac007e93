//! HTTP endpoint for fake news detection
//!
//! `GET /` serves a submission form, `POST /detect` classifies the form field `text` and answers
//! with `{"inference": "Fake" | "Real"}`. Every failure, including a missing or empty text, is
//! answered with HTTP 500 and `{"error": "<message>"}`.

mod handlers;

pub use handlers::*;

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use burn::tensor::backend::Backend;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    pipelines::text_classification::{self, Classifier, Detector},
    utils::renderer::render_index,
};

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Classification failed, including invalid input
    #[error(transparent)]
    Detection(#[from] text_classification::Error),

    /// The request body is not a readable form
    #[error("malformed request: {0}")]
    Request(#[from] FormRejection),

    /// The index page could not be rendered
    #[error("render error: {0}")]
    Render(String),

    /// Binding or serving failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker thread failed
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server address
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 5000)),
        }
    }
}

impl ServerConfig {
    /// Create config with custom address
    pub fn with_address(mut self, addr: SocketAddr) -> Self {
        self.address = addr;
        self
    }
}

/// Shared by every request: the detector is loaded once at startup
pub struct AppState<B: Backend, M: Classifier<B>> {
    /// The trained model, one inference at a time
    pub detector: Arc<Mutex<Detector<B, M>>>,

    /// The rendered index page
    pub index: Arc<String>,
}

impl<B: Backend, M: Classifier<B>> Clone for AppState<B, M> {
    fn clone(&self) -> Self {
        Self {
            detector: self.detector.clone(),
            index: self.index.clone(),
        }
    }
}

impl<B: Backend, M: Classifier<B>> AppState<B, M> {
    /// Wrap a loaded detector, rendering the index page for the named model
    pub fn new(detector: Detector<B, M>, model_name: &str) -> Result<Self> {
        let index = render_index(model_name).map_err(|e| ServerError::Render(e.to_string()))?;

        Ok(Self {
            detector: Arc::new(Mutex::new(detector)),
            index: Arc::new(index),
        })
    }
}

/// Build the application routes
pub fn router<B, M>(state: AppState<B, M>) -> Router
where
    B: Backend,
    M: Classifier<B> + 'static,
{
    Router::new()
        .route("/", get(index::<B, M>))
        .route("/detect", post(detect::<B, M>))
        .with_state(state)
}

/// Serve the detector until the process is stopped
pub async fn serve<B, M>(config: ServerConfig, state: AppState<B, M>) -> Result<()>
where
    B: Backend,
    M: Classifier<B> + 'static,
{
    let listener = tokio::net::TcpListener::bind(config.address).await?;

    info!("Listening on http://{}", config.address);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{
        pipelines::text_classification::{ModelConfig, Tokenization},
        testing::{word_tokenizer, TestBackend, TinyClassifier, TinyConfig, TEST_DEVICE},
    };

    use super::*;

    fn app() -> Router {
        let config = TinyConfig::new();
        let tokenization = Tokenization::new(word_tokenizer(), &config).unwrap();
        let model: TinyClassifier<TestBackend> = config.init(&TEST_DEVICE);

        let detector = Detector::new(model, tokenization, TEST_DEVICE);

        router(AppState::new(detector, "tiny").unwrap())
    }

    async fn post_form(body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/detect")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        send(app(), request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn detects_fake_or_real() {
        let (status, body) = post_form("text=Scientists+confirm+water+is+wet").await;

        assert_eq!(status, StatusCode::OK);

        let inference = body["inference"].as_str().unwrap();
        assert!(inference == "Fake" || inference == "Real");
    }

    #[tokio::test]
    async fn empty_text_is_an_error() {
        let (status, body) = post_form("text=").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("invalid input"));
    }

    #[tokio::test]
    async fn missing_text_is_an_error() {
        let (status, body) = post_form("title=nothing").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unreadable_form_is_a_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/detect")
            .body(Body::from("text=hello"))
            .unwrap();

        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed request"));
    }

    #[tokio::test]
    async fn recovers_from_a_poisoned_detector() {
        let config = TinyConfig::new();
        let tokenization = Tokenization::new(word_tokenizer(), &config).unwrap();
        let model: TinyClassifier<TestBackend> = config.init(&TEST_DEVICE);
        let state = AppState::new(Detector::new(model, tokenization, TEST_DEVICE), "tiny").unwrap();

        let detector = state.detector.clone();
        let _ = std::thread::spawn(move || {
            let _guard = detector.lock().unwrap();
            panic!("worker failed while holding the detector");
        })
        .join();
        assert!(state.detector.is_poisoned());

        let request = Request::builder()
            .method("POST")
            .uri("/detect")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=water+is+wet"))
            .unwrap();

        let (status, body) = send(router(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["inference"].is_string());
    }

    #[tokio::test]
    async fn serves_the_submission_form() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"action="/detect""#));
    }
}
