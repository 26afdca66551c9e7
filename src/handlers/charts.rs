use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    charts::{self, BivariateChart, ChartError, MultivariateChart, PanelOptions, UnivariateChart},
    dataset::Dataset,
    error::AppError,
    form::FormSpec,
    metrics,
};

#[derive(Debug, Deserialize)]
pub struct UnivariateQuery {
    pub column: String,
}

#[derive(Debug, Deserialize)]
pub struct BivariateQuery {
    pub x: String,
    pub y: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct MultivariateQuery {
    /// Comma-separated column names
    #[serde(default)]
    pub columns: String,
    pub color: String,
}

fn dataset(state: &AppState) -> Result<&Dataset, AppError> {
    state
        .artifacts
        .dataset()
        .map_err(|failure| AppError::ArtifactUnavailable(failure.to_string()))
}

fn recorded<T>(kind: &str, result: Result<T, ChartError>) -> Result<T, AppError> {
    match result {
        Ok(chart) => {
            metrics::record_chart(kind, "success");
            Ok(chart)
        }
        Err(e) => {
            metrics::record_chart(kind, "invalid_selection");
            tracing::debug!(kind, error = %e, "Rejected chart selection");
            Err(e.into())
        }
    }
}

/// GET /api/form
pub async fn form_spec(State(state): State<AppState>) -> Result<Json<FormSpec>, AppError> {
    Ok(Json(FormSpec::from_dataset(dataset(&state)?)))
}

/// GET /api/panel
pub async fn panel_options(State(state): State<AppState>) -> Result<Json<PanelOptions>, AppError> {
    Ok(Json(PanelOptions::from_dataset(dataset(&state)?)))
}

/// GET /api/charts/univariate
pub async fn univariate(
    State(state): State<AppState>,
    Query(query): Query<UnivariateQuery>,
) -> Result<Json<UnivariateChart>, AppError> {
    let chart = recorded("univariate", charts::univariate(dataset(&state)?, &query.column))?;
    Ok(Json(chart))
}

/// GET /api/charts/bivariate
pub async fn bivariate(
    State(state): State<AppState>,
    Query(query): Query<BivariateQuery>,
) -> Result<Json<BivariateChart>, AppError> {
    let chart = recorded(
        "bivariate",
        charts::bivariate(dataset(&state)?, &query.x, &query.y, &query.color),
    )?;
    Ok(Json(chart))
}

/// GET /api/charts/multivariate ; `null` when fewer than two columns are selected
pub async fn multivariate(
    State(state): State<AppState>,
    Query(query): Query<MultivariateQuery>,
) -> Result<Json<Option<MultivariateChart>>, AppError> {
    let columns: Vec<String> = query
        .columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    let chart = recorded(
        "multivariate",
        charts::multivariate(dataset(&state)?, &columns, &query.color),
    )?;
    Ok(Json(chart))
}
