use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use super::validation::UploadedImage;
use crate::AppState;
use crate::diagnosis::PlantDiagnosis;
use crate::error::AnalysisError;

const FILE_FIELDS: &[&str] = &["file", "image"];

/// Rejections raised while reading the multipart body, before analysis starts.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to read multipart: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("No file provided")]
    MissingFile,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = match self {
            UploadError::Analysis(err) => return err.into_response(),
            UploadError::Multipart(ref err) => err.status(),
            UploadError::MissingFile => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// `POST /analyze`: diagnose a single uploaded plant image.
pub async fn handle_image_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PlantDiagnosis>, UploadError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("");
        if upload.is_some() || !FILE_FIELDS.contains(&name) {
            continue;
        }

        // Plain form values under the same name are not uploads.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        upload = Some(UploadedImage {
            bytes,
            content_type,
            file_name,
        });
    }

    let file = upload.ok_or(UploadError::MissingFile)?;
    let diagnosis = state.diagnosis_service.analyze_image(&file).await?;

    Ok(Json(diagnosis))
}
