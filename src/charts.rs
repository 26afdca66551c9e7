//! Exploratory chart data for the explorer panel.
//!
//! Each chart is computed independently from the dataset on every request.
//! The browser only draws what these functions return.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::dataset::{Column, Dataset};

/// Scatter-matrix columns selected when the panel first renders
pub const DEFAULT_MATRIX_COLUMNS: [&str; 3] = ["age", "bmi", "charges"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{0}' is not categorical")]
    NotCategorical(String),
}

/// Choices offered by the panel's selectors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelOptions {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub all_columns: Vec<String>,
    pub defaults: PanelDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDefaults {
    pub univariate: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub multivariate: Vec<String>,
}

impl PanelOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let numeric_columns = dataset.numeric_columns();
        let categorical_columns = dataset.categorical_columns();
        let all_columns = dataset.column_names();

        let defaults = PanelDefaults {
            univariate: numeric_columns.first().cloned(),
            x: all_columns.first().cloned(),
            y: all_columns.first().cloned(),
            color: categorical_columns.first().cloned(),
            multivariate: DEFAULT_MATRIX_COLUMNS
                .iter()
                .filter(|c| numeric_columns.iter().any(|n| n == *c))
                .map(|c| c.to_string())
                .collect(),
        };

        Self {
            numeric_columns,
            categorical_columns,
            all_columns,
            defaults,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Box-plot summary; whiskers stop at the last point inside 1.5 IQR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnivariateChart {
    pub column: String,
    pub title: String,
    pub count: usize,
    pub bins: Vec<HistogramBin>,
    pub summary: Option<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGroup {
    pub name: String,
    pub x: Vec<Value>,
    pub y: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BivariateChart {
    pub x: String,
    pub y: String,
    pub color: String,
    pub title: String,
    pub groups: Vec<ScatterGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixGroup {
    pub name: String,
    /// One vector per dimension, rows aligned across dimensions
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultivariateChart {
    pub dimensions: Vec<String>,
    pub color: String,
    pub title: String,
    pub groups: Vec<MatrixGroup>,
}

/// Histogram with a marginal box summary for one numeric column
pub fn univariate(dataset: &Dataset, column: &str) -> Result<UnivariateChart, ChartError> {
    let values = numeric_column(dataset, column)?;
    let mut present: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    present.sort_by(|a, b| a.total_cmp(b));

    Ok(UnivariateChart {
        column: column.to_string(),
        title: format!("Distribution of {}", column),
        count: present.len(),
        bins: histogram(&present),
        summary: box_summary(&present),
    })
}

/// Scatter of `x` against `y`, one group per value of the `color` column
pub fn bivariate(dataset: &Dataset, x: &str, y: &str, color: &str) -> Result<BivariateChart, ChartError> {
    let x_col = column(dataset, x)?;
    let y_col = column(dataset, y)?;
    let colors = categorical_column(dataset, color)?;

    let mut groups: Vec<ScatterGroup> = Vec::new();
    for (row, key) in colors.iter().enumerate() {
        let idx = group_index(&mut groups, key, |name| ScatterGroup {
            name,
            x: Vec::new(),
            y: Vec::new(),
        });
        groups[idx].x.push(x_col.json_value(row));
        groups[idx].y.push(y_col.json_value(row));
    }

    Ok(BivariateChart {
        x: x.to_string(),
        y: y.to_string(),
        color: color.to_string(),
        title: format!("{} vs {} by {}", x, y, color),
        groups,
    })
}

/// Scatter matrix over numeric `columns`; `None` when fewer than two remain
pub fn multivariate(
    dataset: &Dataset,
    columns: &[String],
    color: &str,
) -> Result<Option<MultivariateChart>, ChartError> {
    let mut dimensions: Vec<String> = Vec::new();
    for name in columns {
        if !dimensions.contains(name) {
            dimensions.push(name.clone());
        }
    }

    let series = dimensions
        .iter()
        .map(|name| numeric_column(dataset, name))
        .collect::<Result<Vec<_>, _>>()?;
    let colors = categorical_column(dataset, color)?;

    if dimensions.len() < 2 {
        return Ok(None);
    }

    let mut groups: Vec<MatrixGroup> = Vec::new();
    for (row, key) in colors.iter().enumerate() {
        let cells: Option<Vec<f64>> = series.iter().map(|s| s.get(row).copied().flatten()).collect();
        let Some(cells) = cells else {
            continue;
        };
        let width = dimensions.len();
        let idx = group_index(&mut groups, key, |name| MatrixGroup {
            name,
            values: vec![Vec::new(); width],
        });
        for (dim, value) in cells.into_iter().enumerate() {
            groups[idx].values[dim].push(value);
        }
    }

    Ok(Some(MultivariateChart {
        dimensions,
        color: color.to_string(),
        title: "Scatter Matrix".to_string(),
        groups,
    }))
}

fn column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, ChartError> {
    dataset
        .column(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
}

fn numeric_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a [Option<f64>], ChartError> {
    column(dataset, name)?
        .as_numeric()
        .ok_or_else(|| ChartError::NotNumeric(name.to_string()))
}

fn categorical_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a [String], ChartError> {
    column(dataset, name)?
        .as_categorical()
        .ok_or_else(|| ChartError::NotCategorical(name.to_string()))
}

fn group_index<G>(groups: &mut Vec<G>, key: &str, make: impl FnOnce(String) -> G) -> usize
where
    G: Named,
{
    match groups.iter().position(|g| g.name() == key) {
        Some(idx) => idx,
        None => {
            groups.push(make(key.to_string()));
            groups.len() - 1
        }
    }
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for ScatterGroup {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for MatrixGroup {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Equal-width bins, Sturges' rule for the bin count. `sorted` must be ascending.
fn histogram(sorted: &[f64]) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };

    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let bin_count = ((sorted.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bin_count { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in sorted {
        let idx = (((value - min) / width) as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }

    bins
}

/// Linearly interpolated quantile of ascending data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

fn box_summary(sorted: &[f64]) -> Option<BoxSummary> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let q1 = quantile(sorted, 0.25);
    let median = quantile(sorted, 0.5);
    let q3 = quantile(sorted, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = sorted.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
    let lower_whisker = inside.clone().next().unwrap_or(min);
    let upper_whisker = inside.last().unwrap_or(max);

    Some(BoxSummary {
        min,
        q1,
        median,
        q3,
        max,
        lower_whisker,
        upper_whisker,
        outliers: sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect(),
    })
}
