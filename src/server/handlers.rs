//! HTTP request handlers

use std::sync::PoisonError;

use axum::{
    extract::{rejection::FormRejection, Form, State},
    response::Html,
    Json,
};
use burn::tensor::backend::Backend;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::pipelines::text_classification::{Classifier, Error, Label};

use super::{AppState, Result, ServerError};

/// The submitted form
#[derive(Debug, Clone, Deserialize)]
pub struct DetectRequest {
    /// The news text to classify
    pub text: Option<String>,
}

/// The class of the submitted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    /// "Fake" or "Real"
    pub inference: Label,
}

/// The body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
}

/// Serve the submission form
pub async fn index<B, M>(State(state): State<AppState<B, M>>) -> Html<String>
where
    B: Backend,
    M: Classifier<B> + 'static,
{
    Html(state.index.as_ref().clone())
}

/// Classify the submitted text
pub async fn detect<B, M>(
    State(state): State<AppState<B, M>>,
    request: std::result::Result<Form<DetectRequest>, FormRejection>,
) -> Result<Json<DetectResponse>>
where
    B: Backend,
    M: Classifier<B> + 'static,
{
    let Form(request) = request?;

    let text = request
        .text
        .ok_or_else(|| Error::InvalidInput("the `text` field is required".to_string()))?;

    let prediction = tokio::task::spawn_blocking(move || {
        // Read-only, so a lock poisoned by a panicking request is still usable
        let detector = state
            .detector
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Ok::<_, ServerError>(detector.predict(&text)?)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    debug!("Classified a submission as {}", prediction.label);

    Ok(Json(DetectResponse {
        inference: prediction.label,
    }))
}
