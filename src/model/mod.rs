//! Pre-trained charges model.
//!
//! The model artifact is a JSON document describing how the six request
//! fields are encoded into a feature vector and the estimator that maps that
//! vector to a charge:
//!
//! - [`FeatureEncoder`]: standardized numeric features followed by one-hot blocks
//! - [`LinearEstimator`]: intercept plus coefficients
//! - [`TreeEnsemble`]: averaged (forest) or summed (boosted) regression trees
//!
//! Everything the server needs from a model goes through the [`Predictor`] trait.

mod encoder;
mod linear;
mod tree;

pub use encoder::{CategoricalFeature, FeatureEncoder, HandleUnknown, NumericFeature};
pub use linear::LinearEstimator;
pub use tree::{Aggregation, RegressionTree, TreeEnsemble, TreeNode};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::prediction::PredictionRequest;

/// Fields every model must declare
pub const REQUEST_FIELDS: [&str; 6] = ["age", "sex", "bmi", "children", "smoker", "region"];

/// Failure while producing a prediction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },
    #[error("request has no value for feature '{0}'")]
    MissingFeature(String),
    #[error("model produced a non-finite value ({0})")]
    NonFinite(f64),
}

/// Failure while reading or validating a model artifact
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Anything that maps a request to a predicted charge
pub trait Predictor: Send + Sync {
    /// Predicted charge before rounding
    fn predict(&self, request: &PredictionRequest) -> Result<f64, InferenceError>;

    /// Model name
    fn name(&self) -> &str;

    /// Model version
    fn version(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    #[default]
    Identity,
    /// Trained on `ln(1 + charges)`; predictions are mapped back with `exp(x) - 1`
    Log1p,
}

impl TargetTransform {
    fn inverse(self, raw: f64) -> f64 {
        match self {
            Self::Identity => raw,
            Self::Log1p => raw.exp_m1(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    Linear(LinearEstimator),
    TreeEnsemble(TreeEnsemble),
}

impl Estimator {
    fn evaluate(&self, features: &[f64]) -> f64 {
        match self {
            Self::Linear(linear) => linear.evaluate(features),
            Self::TreeEnsemble(ensemble) => ensemble.evaluate(features),
        }
    }

    fn validate(&self, width: usize) -> Result<(), ModelLoadError> {
        match self {
            Self::Linear(linear) => linear.validate(width),
            Self::TreeEnsemble(ensemble) => ensemble.validate(width),
        }
    }
}

/// Deserialized model artifact
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub features: FeatureEncoder,
    pub estimator: Estimator,
    #[serde(default)]
    pub target_transform: TargetTransform,
}

fn default_version() -> String {
    "0".to_string()
}

impl ModelArtifact {
    /// Read and validate an artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_json(&text)?;

        info!(
            path = %path.display(),
            model = %artifact.name,
            version = %artifact.version,
            features = artifact.features.width(),
            "Loaded model artifact"
        );
        Ok(artifact)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelLoadError> {
        let artifact: Self = serde_json::from_str(text)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        for field in REQUEST_FIELDS {
            if !self.features.declares(field) {
                return Err(ModelLoadError::Invalid(format!(
                    "feature '{}' is not declared",
                    field
                )));
            }
        }
        self.features.validate()?;
        self.estimator.validate(self.features.width())
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, request: &PredictionRequest) -> Result<f64, InferenceError> {
        let features = self.features.encode(request)?;
        let raw = self.estimator.evaluate(&features);
        let value = self.target_transform.inverse(raw);

        debug!(raw, value, "Evaluated model");

        if !value.is_finite() {
            return Err(InferenceError::NonFinite(value));
        }
        Ok(value)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Linear model over the insurance features used throughout the tests
    pub(crate) const LINEAR_MODEL: &str = r#"{
        "name": "charges-linear",
        "version": "1",
        "features": {
            "numeric": [
                {"name": "age", "mean": 39.2, "scale": 14.0},
                {"name": "bmi", "mean": 30.66, "scale": 6.1},
                {"name": "children", "mean": 1.09, "scale": 1.2}
            ],
            "categorical": [
                {"name": "sex", "categories": ["female", "male"], "drop_first": true},
                {"name": "smoker", "categories": ["no", "yes"], "drop_first": true},
                {"name": "region", "categories": ["northeast", "northwest", "southeast", "southwest"], "drop_first": true}
            ],
            "handle_unknown": "error"
        },
        "estimator": {
            "type": "linear",
            "intercept": 8500.0,
            "coefficients": [3600.0, 2050.0, 570.0, -130.0, 23850.0, -350.0, -1035.0, -960.0]
        }
    }"#;

    pub(crate) fn linear_model() -> ModelArtifact {
        ModelArtifact::from_json(LINEAR_MODEL).unwrap()
    }

    pub(crate) fn request(age: i64, sex: &str, bmi: f64, children: i64, smoker: &str, region: &str) -> PredictionRequest {
        PredictionRequest {
            age,
            sex: sex.to_string(),
            bmi,
            children,
            smoker: smoker.to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn test_linear_prediction_matches_hand_computation() {
        let model = linear_model();
        let req = request(30, "female", 25.0, 0, "no", "southwest");
        let value = model.predict(&req).unwrap();

        let expected = 8500.0
            + 3600.0 * (30.0 - 39.2) / 14.0
            + 2050.0 * (25.0 - 30.66) / 6.1
            + 570.0 * (0.0 - 1.09) / 1.2
            - 960.0;
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let model = linear_model();
        let req = request(45, "male", 31.2, 2, "yes", "northeast");
        let first = model.predict(&req).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict(&req).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_category_is_an_inference_error() {
        let model = linear_model();
        let req = request(30, "female", 25.0, 0, "no", "mars");
        let err = model.predict(&req).unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownCategory {
                feature: "region".to_string(),
                value: "mars".to_string()
            }
        );
    }

    #[test]
    fn test_log1p_target_transform() {
        let mut doc: serde_json::Value = serde_json::from_str(LINEAR_MODEL).unwrap();
        doc["target_transform"] = serde_json::json!("log1p");
        let text = doc.to_string();
        let mut model = ModelArtifact::from_json(&text).unwrap();
        assert_eq!(model.target_transform, TargetTransform::Log1p);

        model.estimator = Estimator::Linear(LinearEstimator {
            intercept: 9.0_f64.ln_1p(),
            coefficients: vec![0.0; 8],
        });
        let value = model.predict(&request(30, "female", 25.0, 0, "no", "southwest")).unwrap();
        assert!((value - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_output_is_rejected() {
        let mut model = linear_model();
        model.estimator = Estimator::Linear(LinearEstimator {
            intercept: f64::INFINITY,
            coefficients: vec![0.0; 8],
        });
        let err = model.predict(&request(30, "female", 25.0, 0, "no", "southwest")).unwrap_err();
        assert!(matches!(err, InferenceError::NonFinite(_)));
    }

    #[test]
    fn test_coefficient_count_is_validated() {
        let text = LINEAR_MODEL.replace(", -960.0]", "]");
        let err = ModelArtifact::from_json(&text).unwrap_err();
        assert!(matches!(err, ModelLoadError::Invalid(_)));
    }

    #[test]
    fn test_undeclared_request_field_is_rejected() {
        let text = LINEAR_MODEL.replace(
            "{\"name\": \"children\", \"mean\": 1.09, \"scale\": 1.2}",
            "{\"name\": \"dependents\", \"mean\": 1.09, \"scale\": 1.2}",
        );
        let err = ModelArtifact::from_json(&text).unwrap_err();
        assert!(err.to_string().contains("'children'"));
    }

    #[test]
    fn test_malformed_json() {
        let err = ModelArtifact::from_json("{not json").unwrap_err();
        assert!(matches!(err, ModelLoadError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::load(&dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }
}
