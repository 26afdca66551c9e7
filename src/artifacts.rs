//! Startup loading of the dataset and model artifacts.
//!
//! Both artifacts are read exactly once before the listener is bound. A
//! failure is logged and kept as an [`ArtifactLoadFailure`] so the front-ends
//! can show it; it never aborts the process.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::ArtifactsConfig;
use crate::dataset::Dataset;
use crate::metrics;
use crate::model::{ModelArtifact, Predictor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Dataset,
    Model,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Model => "model",
        }
    }
}

/// A dataset or model file that could not be read at startup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactLoadFailure {
    pub artifact: ArtifactKind,
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for ArtifactLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.artifact {
            ArtifactKind::Dataset => write!(f, "Error loading data: {}", self.reason),
            ArtifactKind::Model => write!(f, "Error loading model: {}", self.reason),
        }
    }
}

impl std::error::Error for ArtifactLoadFailure {}

/// Process-wide artifacts, immutable after startup
pub struct Artifacts {
    dataset: Result<Arc<Dataset>, ArtifactLoadFailure>,
    model: Result<Arc<dyn Predictor>, ArtifactLoadFailure>,
}

impl Artifacts {
    pub fn new(
        dataset: Result<Arc<Dataset>, ArtifactLoadFailure>,
        model: Result<Arc<dyn Predictor>, ArtifactLoadFailure>,
    ) -> Self {
        Self { dataset, model }
    }

    /// Load both artifacts from the configured paths
    pub fn load(cfg: &ArtifactsConfig) -> Self {
        info!(
            dataset = %cfg.dataset_path.display(),
            model = %cfg.model_path.display(),
            "Loading artifacts"
        );

        let dataset = Dataset::load(&cfg.dataset_path)
            .map(Arc::new)
            .map_err(|e| failure(ArtifactKind::Dataset, cfg.dataset_path.clone(), e));

        let model = ModelArtifact::load(&cfg.model_path)
            .map(|m| Arc::new(m) as Arc<dyn Predictor>)
            .map_err(|e| failure(ArtifactKind::Model, cfg.model_path.clone(), e));

        metrics::record_artifact(ArtifactKind::Dataset.as_str(), dataset.is_ok());
        metrics::record_artifact(ArtifactKind::Model.as_str(), model.is_ok());

        Self { dataset, model }
    }

    pub fn dataset(&self) -> Result<&Dataset, &ArtifactLoadFailure> {
        self.dataset.as_deref()
    }

    pub fn model(&self) -> Result<&dyn Predictor, &ArtifactLoadFailure> {
        self.model.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.dataset.is_ok() && self.model.is_ok()
    }
}

fn failure(artifact: ArtifactKind, path: PathBuf, err: impl std::error::Error) -> ArtifactLoadFailure {
    error!(
        artifact = artifact.as_str(),
        path = %path.display(),
        error = %err,
        "Failed to load artifact"
    );
    ArtifactLoadFailure {
        artifact,
        path,
        reason: err.to_string(),
    }
}
