use serde::{Deserialize, Serialize};

use super::ModelLoadError;

/// One node of a regression tree, stored in a flat array with the root at index 0
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left, everything else (including NaN) goes right
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { leaf: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Children must point forward, which rules out cycles and dangling indices
    fn validate(&self, width: usize, tree_idx: usize) -> Result<(), ModelLoadError> {
        if self.nodes.is_empty() {
            return Err(ModelLoadError::Invalid(format!("tree {} has no nodes", tree_idx)));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { leaf } if !leaf.is_finite() => {
                    return Err(ModelLoadError::Invalid(format!(
                        "tree {} node {} has a non-finite leaf",
                        tree_idx, idx
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= width {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {} node {} splits on feature {} (width {})",
                            tree_idx, idx, feature, width
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ModelLoadError::Invalid(format!(
                                "tree {} node {} has invalid child {}",
                                tree_idx, idx, child
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Random forest style
    #[default]
    Mean,
    /// Gradient boosting style
    Sum,
}

/// `base_score + learning_rate * aggregate(tree outputs)`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "unit_rate")]
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

fn unit_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.evaluate(features)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        self.base_score + self.learning_rate * combined
    }

    pub(super) fn validate(&self, width: usize) -> Result<(), ModelLoadError> {
        if self.trees.is_empty() {
            return Err(ModelLoadError::Invalid("tree ensemble has no trees".to_string()));
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelLoadError::Invalid(
                "tree ensemble has a non-finite base score or learning rate".to_string(),
            ));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(width, idx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{request, LINEAR_MODEL};
    use crate::model::{Estimator, ModelArtifact, Predictor};

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { leaf: low },
                TreeNode::Leaf { leaf: high },
            ],
        }
    }

    #[test]
    fn test_tree_routes_by_threshold() {
        let tree = stump(0, 0.5, 10.0, 20.0);
        assert_eq!(tree.evaluate(&[0.5]), 10.0);
        assert_eq!(tree.evaluate(&[0.6]), 20.0);
        assert_eq!(tree.evaluate(&[f64::NAN]), 20.0);
    }

    #[test]
    fn test_mean_and_sum_aggregation() {
        let mut ensemble = TreeEnsemble {
            aggregation: Aggregation::Mean,
            base_score: 0.0,
            learning_rate: 1.0,
            trees: vec![stump(0, 0.0, 1.0, 3.0), stump(0, 0.0, 5.0, 7.0)],
        };
        assert_eq!(ensemble.evaluate(&[1.0]), 5.0);

        ensemble.aggregation = Aggregation::Sum;
        ensemble.base_score = 100.0;
        ensemble.learning_rate = 0.5;
        assert_eq!(ensemble.evaluate(&[1.0]), 100.0 + 0.5 * 10.0);
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { leaf: 1.0 },
            ],
        };
        assert!(tree.validate(1, 0).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_feature() {
        let tree = stump(4, 0.0, 1.0, 2.0);
        assert!(tree.validate(4, 0).is_err());
        assert!(tree.validate(5, 0).is_ok());
    }

    #[test]
    fn test_tree_ensemble_artifact_from_json() {
        let mut doc: serde_json::Value = serde_json::from_str(LINEAR_MODEL).unwrap();
        // feature 4 is smoker=yes in the shared test encoder
        doc["estimator"] = serde_json::json!({
            "type": "tree_ensemble",
            "aggregation": "sum",
            "base_score": 8000.0,
            "trees": [
                {"nodes": [
                    {"feature": 4, "threshold": 0.5, "left": 1, "right": 2},
                    {"leaf": 0.0},
                    {"leaf": 24000.0}
                ]}
            ]
        });
        let model = ModelArtifact::from_json(&doc.to_string()).unwrap();
        assert!(matches!(model.estimator, Estimator::TreeEnsemble(_)));

        let smoker = model.predict(&request(30, "female", 25.0, 0, "yes", "southwest")).unwrap();
        let non_smoker = model.predict(&request(30, "female", 25.0, 0, "no", "southwest")).unwrap();
        assert_eq!(smoker, 32000.0);
        assert_eq!(non_smoker, 8000.0);
    }
}
