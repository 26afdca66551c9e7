//! Request/response contract around a single inference call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::metrics;
use crate::model::{InferenceError, Predictor};

pub const AGE_RANGE: (i64, i64) = (16, 80);
pub const BMI_RANGE: (f64, f64) = (14.0, 80.0);
pub const CHILDREN_RANGE: (i64, i64) = (0, 10);

/// The six form values submitted for one prediction
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionRequest {
    pub age: i64,
    pub sex: String,
    pub bmi: f64,
    pub children: i64,
    pub smoker: String,
    pub region: String,
}

impl PredictionRequest {
    /// Clamp numeric fields to the widget bounds; categorical values pass through untouched
    pub fn clamped(mut self) -> Self {
        self.age = self.age.clamp(AGE_RANGE.0, AGE_RANGE.1);
        self.bmi = if self.bmi.is_nan() {
            BMI_RANGE.0
        } else {
            self.bmi.clamp(BMI_RANGE.0, BMI_RANGE.1)
        };
        self.children = self.children.clamp(CHILDREN_RANGE.0, CHILDREN_RANGE.1);
        self
    }
}

/// Predicted charges, rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: f64,
}

impl PredictionResult {
    /// Negative model output is floored at zero before rounding
    pub fn from_raw(raw: f64) -> Self {
        let value = if raw < 0.0 { 0.0 } else { raw };
        Self {
            prediction: (value * 100.0).round() / 100.0,
        }
    }

    /// `$ 12,345.67`
    pub fn display(&self) -> String {
        format_currency(self.prediction)
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format an amount as dollars with thousands separators and two decimals
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}$ {}.{:02}", sign, grouped, fraction)
}

/// Run one request through the model.
///
/// The request is clamped to widget bounds first; model failures come back as
/// [`InferenceError`] and never panic the caller.
pub fn run_prediction(
    model: &dyn Predictor,
    request: PredictionRequest,
) -> Result<PredictionResult, InferenceError> {
    let start = Instant::now();
    let request = request.clamped();

    match model.predict(&request) {
        Ok(raw) => {
            let result = PredictionResult::from_raw(raw);
            metrics::record_prediction("success", start.elapsed());
            tracing::info!(
                model = model.name(),
                age = request.age,
                bmi = request.bmi,
                children = request.children,
                smoker = %request.smoker,
                region = %request.region,
                prediction = result.prediction,
                duration_us = start.elapsed().as_micros() as u64,
                "Prediction completed"
            );
            Ok(result)
        }
        Err(e) => {
            metrics::record_prediction("inference_error", start.elapsed());
            tracing::warn!(
                model = model.name(),
                error = %e,
                "Prediction failed"
            );
            Err(e)
        }
    }
}
