use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::{charts::ChartError, model::InferenceError};

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// A startup artifact (dataset or model) is not available
    ArtifactUnavailable(String),
    /// The model failed while producing a prediction
    InferenceFailed(String),
    /// Chart selection refers to an unusable column
    InvalidSelection(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArtifactUnavailable(msg) => write!(f, "Artifact unavailable: {}", msg),
            Self::InferenceFailed(msg) => write!(f, "Error during prediction: {}", msg),
            Self::InvalidSelection(msg) => write!(f, "Invalid selection: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ArtifactUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InferenceFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidSelection(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ArtifactUnavailable(_) => "artifact_unavailable",
        AppError::InferenceFailed(_) => "inference_failed",
        AppError::InvalidSelection(_) => "invalid_selection",
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        Self::InferenceFailed(err.to_string())
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        Self::InvalidSelection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::InferenceFailed("unknown category 'mars' for feature 'region'".to_string());
        assert_eq!(
            error.to_string(),
            "Error during prediction: unknown category 'mars' for feature 'region'"
        );
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(
            error_type_name(&AppError::ArtifactUnavailable("model".to_string())),
            "artifact_unavailable"
        );
        assert_eq!(
            error_type_name(&AppError::InvalidSelection("x".to_string())),
            "invalid_selection"
        );
    }

    #[tokio::test]
    async fn test_error_response_status() {
        let response = AppError::ArtifactUnavailable("model".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = AppError::InferenceFailed("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
