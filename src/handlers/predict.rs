use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::{
    error::AppError,
    prediction::{self, PredictionRequest, PredictionResult},
};

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: f64,
    pub display: String,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.prediction,
            display: result.display(),
        }
    }
}

/// Run one request against the loaded model.
///
/// A missing model is reported without attempting inference.
pub fn predict(state: &AppState, request: PredictionRequest) -> Result<PredictionResult, AppError> {
    let model = state.artifacts.model().map_err(|failure| {
        crate::metrics::record_prediction("model_unavailable", std::time::Duration::ZERO);
        AppError::ArtifactUnavailable(failure.to_string())
    })?;

    Ok(prediction::run_prediction(model, request)?)
}

/// Handle POST /api/predict
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let result = predict(&state, request)?;
    Ok(Json(result.into()))
}
