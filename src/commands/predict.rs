use anyhow::{anyhow, Result};
use charges_predictor::{
    config::Config,
    model::ModelArtifact,
    prediction::{run_prediction, PredictionRequest},
};

use crate::cli::PredictArgs;

/// Execute the predict command
///
/// Only the model artifact is needed; the dataset is not read.
pub fn execute(cfg: &Config, args: PredictArgs) -> Result<()> {
    let model = ModelArtifact::load(&cfg.artifacts.model_path)
        .map_err(|e| anyhow!("Error loading model: {}", e))?;

    let request = PredictionRequest {
        age: args.age,
        sex: args.sex,
        bmi: args.bmi,
        children: args.children,
        smoker: args.smoker,
        region: args.region,
    };

    let result = run_prediction(&model, request)
        .map_err(|e| anyhow!("Error during prediction: {}", e))?;

    println!("{}", result.display());
    Ok(())
}
