use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Message returned to callers for every failure past validation.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to analyze image and generate structured response.";

/// Upload rejected before the model is contacted. The message is safe to show to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image file is too large ({size} bytes). Please use an image smaller than {}MB.", .limit / (1024 * 1024))]
    TooLarge { size: usize, limit: usize },

    #[error("Invalid file type: {declared}. Only JPEG/PNG/GIF images are supported.")]
    UnsupportedType { declared: String },

    #[error("Image file is empty.")]
    Empty,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Gemini request failed: {0:#}")]
    Upstream(anyhow::Error),

    #[error("Gemini returned an empty response")]
    EmptyResponse,

    #[error("Gemini response is not valid JSON: {0}")]
    MalformedJson(serde_json::Error),

    #[error("Gemini response does not match the diagnosis shape: {0}")]
    UnexpectedShape(String),
}

impl AnalysisError {
    /// Sort a serde_json failure into a syntax error or a shape mismatch.
    pub fn from_json(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => Self::UnexpectedShape(err.to_string()),
            _ => Self::MalformedJson(err),
        }
    }

    pub fn is_json_syntax(&self) -> bool {
        matches!(self, Self::MalformedJson(_))
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AnalysisError::Validation(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
