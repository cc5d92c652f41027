use anyhow::Context;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::models::PlantDiagnosis;
use super::normalize::strip_code_fences;
use super::profile::DiagnosisProfile;
use super::schema::ResponseSchema;
use crate::error::AnalysisError;
use crate::gemini::{DiagnosisRequest, GenerativeModel, InlineImage};
use crate::media_ingestion::validation::{UploadedImage, validate_upload};

/// Validates an uploaded plant image, asks the model for a diagnosis and parses the answer.
///
/// Holds no per-request state; one instance serves every request concurrently.
pub struct ImageDiagnosisService {
    model: Arc<dyn GenerativeModel>,
    profile: DiagnosisProfile,
    prompt: String,
    schema: Option<ResponseSchema>,
}

impl ImageDiagnosisService {
    pub fn new(model: Arc<dyn GenerativeModel>, profile: DiagnosisProfile) -> anyhow::Result<Self> {
        let schema = if profile.strict_schema {
            let schema = ResponseSchema::for_profile(&profile);
            schema.validate().context("Invalid diagnosis response schema")?;
            Some(schema)
        } else {
            None
        };

        Ok(Self {
            prompt: profile.prompt(),
            model,
            profile,
            schema,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn profile(&self) -> &DiagnosisProfile {
        &self.profile
    }

    pub async fn analyze_image(&self, file: &UploadedImage) -> Result<PlantDiagnosis, AnalysisError> {
        let analysis_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze_image", %analysis_id, file_name = %file.file_name);

        async move {
            let mime_type = validate_upload(file).inspect_err(|e| {
                tracing::warn!("Rejected upload: {}", e);
            })?;

            tracing::info!(
                "Analyzing file: {}, declared type: {}, final MimeType used: {}, {} bytes",
                file.file_name,
                file.content_type,
                mime_type,
                file.size()
            );

            let request = DiagnosisRequest {
                prompt: self.prompt.clone(),
                image: InlineImage::encode(&file.bytes, mime_type),
                response_schema: self.schema.clone(),
            };

            match self.diagnose(request).await {
                Ok(diagnosis) => {
                    tracing::info!(
                        "Diagnosis complete: {} (severity: {})",
                        diagnosis.disease_name,
                        diagnosis.severity
                    );
                    Ok(diagnosis)
                }
                Err(err) => {
                    tracing::error!("Gemini analysis failed: {}", err);
                    if err.is_json_syntax() {
                        tracing::error!(
                            "JSON parsing error: the model may not have returned valid JSON"
                        );
                    }
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn diagnose(&self, request: DiagnosisRequest) -> Result<PlantDiagnosis, AnalysisError> {
        let raw_text = self
            .model
            .generate(request)
            .await
            .map_err(AnalysisError::Upstream)?;

        let json_text = strip_code_fences(&raw_text);
        if json_text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        let diagnosis: PlantDiagnosis =
            serde_json::from_str(json_text).map_err(AnalysisError::from_json)?;

        self.profile
            .check(&diagnosis)
            .map_err(AnalysisError::UnexpectedShape)?;

        Ok(diagnosis)
    }
}
