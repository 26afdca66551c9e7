//! Form controls for the six prediction inputs.
//!
//! Numeric fields get sliders with fixed bounds; categorical fields get
//! selectors whose options come from the loaded dataset.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::prediction::{PredictionRequest, AGE_RANGE, BMI_RANGE, CHILDREN_RANGE};

pub const DEFAULT_AGE: i64 = 30;
pub const DEFAULT_BMI: f64 = 25.0;
pub const DEFAULT_CHILDREN: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<String>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    Slider(Slider),
    Selector(Selector),
}

impl Control {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slider(s) => s.name,
            Self::Selector(s) => s.name,
        }
    }
}

/// The full form, laid out as two columns of three controls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSpec {
    pub columns: [Vec<Control>; 2],
}

impl FormSpec {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let selector = |name: &'static str, label: &'static str| {
            let options = dataset.distinct_values(name);
            Control::Selector(Selector {
                name,
                label,
                default: options.first().cloned(),
                options,
            })
        };

        Self {
            columns: [
                vec![
                    Control::Slider(Slider {
                        name: "age",
                        label: "Age",
                        min: AGE_RANGE.0 as f64,
                        max: AGE_RANGE.1 as f64,
                        step: 1.0,
                        default: DEFAULT_AGE as f64,
                    }),
                    selector("sex", "Sex"),
                    Control::Slider(Slider {
                        name: "bmi",
                        label: "BMI",
                        min: BMI_RANGE.0,
                        max: BMI_RANGE.1,
                        step: 0.1,
                        default: DEFAULT_BMI,
                    }),
                ],
                vec![
                    Control::Slider(Slider {
                        name: "children",
                        label: "Number of Children",
                        min: CHILDREN_RANGE.0 as f64,
                        max: CHILDREN_RANGE.1 as f64,
                        step: 1.0,
                        default: DEFAULT_CHILDREN as f64,
                    }),
                    selector("smoker", "Smoker"),
                    selector("region", "Region"),
                ],
            ],
        }
    }

    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.columns.iter().flatten()
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls().find(|c| c.name() == name)
    }

    /// Values shown before the user touches anything
    pub fn defaults(&self) -> PredictionRequest {
        let first = |name: &str| match self.control(name) {
            Some(Control::Selector(s)) => s.default.clone().unwrap_or_default(),
            _ => String::new(),
        };

        PredictionRequest {
            age: DEFAULT_AGE,
            sex: first("sex"),
            bmi: DEFAULT_BMI,
            children: DEFAULT_CHILDREN,
            smoker: first("smoker"),
            region: first("region"),
        }
    }
}
