use serde::{Deserialize, Serialize};

use super::{InferenceError, ModelLoadError};
use crate::prediction::PredictionRequest;

const NUMERIC_FIELDS: [&str; 3] = ["age", "bmi", "children"];
const CATEGORICAL_FIELDS: [&str; 3] = ["sex", "smoker", "region"];

/// Standardized numeric input: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NumericFeature {
    pub name: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// One-hot encoded categorical input
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoricalFeature {
    pub name: String,
    pub categories: Vec<String>,
    /// The first category is the reference level and gets no column
    #[serde(default)]
    pub drop_first: bool,
}

impl CategoricalFeature {
    fn width(&self) -> usize {
        if self.drop_first {
            self.categories.len().saturating_sub(1)
        } else {
            self.categories.len()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Reject values outside the training categories
    #[default]
    Error,
    /// Encode unknown values as all zeros
    Ignore,
}

/// Maps a request onto the estimator's feature vector.
///
/// Layout: numeric features in declared order, then one block per
/// categorical feature in declared order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeatureEncoder {
    #[serde(default)]
    pub numeric: Vec<NumericFeature>,
    #[serde(default)]
    pub categorical: Vec<CategoricalFeature>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl FeatureEncoder {
    pub fn width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(CategoricalFeature::width).sum::<usize>()
    }

    pub fn declares(&self, field: &str) -> bool {
        self.numeric.iter().any(|f| f.name == field) || self.categorical.iter().any(|f| f.name == field)
    }

    pub(super) fn validate(&self) -> Result<(), ModelLoadError> {
        let mut seen: Vec<&str> = Vec::new();

        for feature in &self.numeric {
            if !NUMERIC_FIELDS.contains(&feature.name.as_str()) {
                return Err(ModelLoadError::Invalid(format!(
                    "'{}' is not a numeric request field",
                    feature.name
                )));
            }
            if !feature.scale.is_finite() || feature.scale == 0.0 || !feature.mean.is_finite() {
                return Err(ModelLoadError::Invalid(format!(
                    "feature '{}' has an unusable mean/scale",
                    feature.name
                )));
            }
            seen.push(&feature.name);
        }

        for feature in &self.categorical {
            if !CATEGORICAL_FIELDS.contains(&feature.name.as_str()) {
                return Err(ModelLoadError::Invalid(format!(
                    "'{}' is not a categorical request field",
                    feature.name
                )));
            }
            if feature.categories.is_empty() {
                return Err(ModelLoadError::Invalid(format!(
                    "feature '{}' has no categories",
                    feature.name
                )));
            }
            seen.push(&feature.name);
        }

        for (idx, name) in seen.iter().enumerate() {
            if seen[..idx].contains(name) {
                return Err(ModelLoadError::Invalid(format!(
                    "feature '{}' is declared twice",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn encode(&self, request: &PredictionRequest) -> Result<Vec<f64>, InferenceError> {
        let mut out = Vec::with_capacity(self.width());

        for feature in &self.numeric {
            let value = numeric_field(request, &feature.name)?;
            out.push((value - feature.mean) / feature.scale);
        }

        for feature in &self.categorical {
            let value = categorical_field(request, &feature.name)?;
            let position = feature.categories.iter().position(|c| c == value);

            if position.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(InferenceError::UnknownCategory {
                    feature: feature.name.clone(),
                    value: value.to_string(),
                });
            }

            let offset = usize::from(feature.drop_first);
            for idx in offset..feature.categories.len() {
                out.push(if position == Some(idx) { 1.0 } else { 0.0 });
            }
        }

        Ok(out)
    }
}

fn numeric_field(request: &PredictionRequest, name: &str) -> Result<f64, InferenceError> {
    match name {
        "age" => Ok(request.age as f64),
        "bmi" => Ok(request.bmi),
        "children" => Ok(request.children as f64),
        other => Err(InferenceError::MissingFeature(other.to_string())),
    }
}

fn categorical_field<'a>(request: &'a PredictionRequest, name: &str) -> Result<&'a str, InferenceError> {
    match name {
        "sex" => Ok(&request.sex),
        "smoker" => Ok(&request.smoker),
        "region" => Ok(&request.region),
        other => Err(InferenceError::MissingFeature(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::request;

    fn encoder(drop_first: bool, handle_unknown: HandleUnknown) -> FeatureEncoder {
        FeatureEncoder {
            numeric: vec![NumericFeature {
                name: "age".to_string(),
                mean: 40.0,
                scale: 10.0,
            }],
            categorical: vec![CategoricalFeature {
                name: "smoker".to_string(),
                categories: vec!["no".to_string(), "yes".to_string()],
                drop_first,
            }],
            handle_unknown,
        }
    }

    #[test]
    fn test_encode_full_one_hot() {
        let enc = encoder(false, HandleUnknown::Error);
        assert_eq!(enc.width(), 3);
        let features = enc.encode(&request(50, "male", 20.0, 0, "yes", "north")).unwrap();
        assert_eq!(features, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encode_drop_first() {
        let enc = encoder(true, HandleUnknown::Error);
        assert_eq!(enc.width(), 2);
        let features = enc.encode(&request(30, "male", 20.0, 0, "no", "north")).unwrap();
        assert_eq!(features, vec![-1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_ignored() {
        let enc = encoder(false, HandleUnknown::Ignore);
        let features = enc.encode(&request(40, "male", 20.0, 0, "sometimes", "north")).unwrap();
        assert_eq!(features, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let mut enc = encoder(false, HandleUnknown::Error);
        enc.numeric[0].scale = 0.0;
        assert!(enc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_field_kind() {
        let mut enc = encoder(false, HandleUnknown::Error);
        enc.numeric[0].name = "region".to_string();
        assert!(enc.validate().unwrap_err().to_string().contains("not a numeric"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut enc = encoder(false, HandleUnknown::Error);
        enc.numeric.push(enc.numeric[0].clone());
        assert!(enc.validate().unwrap_err().to_string().contains("declared twice"));
    }
}
