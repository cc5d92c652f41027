use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthCheckResponse {
    status: String,
    model: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let response = HealthCheckResponse {
        status: "ok".to_string(),
        model: state.diagnosis_service.model_name().to_string(),
    };
    Json(response)
}
