use serde::{Deserialize, Serialize};

use super::ModelLoadError;

/// `intercept + Σ coefficients[i] * x[i]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LinearEstimator {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearEstimator {
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }

    pub(super) fn validate(&self, width: usize) -> Result<(), ModelLoadError> {
        if self.coefficients.len() != width {
            return Err(ModelLoadError::Invalid(format!(
                "linear estimator has {} coefficients but the encoder produces {} features",
                self.coefficients.len(),
                width
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ModelLoadError::Invalid(
                "linear estimator contains non-finite weights".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        let linear = LinearEstimator {
            intercept: 1.5,
            coefficients: vec![2.0, -1.0],
        };
        assert_eq!(linear.evaluate(&[3.0, 4.0]), 1.5 + 6.0 - 4.0);
    }

    #[test]
    fn test_validate_width() {
        let linear = LinearEstimator {
            intercept: 0.0,
            coefficients: vec![1.0],
        };
        assert!(linear.validate(1).is_ok());
        assert!(linear.validate(2).is_err());
    }

    #[test]
    fn test_validate_rejects_nan_weight() {
        let linear = LinearEstimator {
            intercept: 0.0,
            coefficients: vec![f64::NAN],
        };
        assert!(linear.validate(1).is_err());
    }
}
