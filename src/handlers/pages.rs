use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

use super::{predict::predict, AppState};
use crate::{
    pages::{render_page, FrontEnd, Outcome},
    prediction::PredictionRequest,
};

/// GET / : explorer with form and chart panel
pub async fn explorer_page(State(state): State<AppState>) -> Response {
    page(&state, FrontEnd::Explorer)
}

/// GET /basic : form and result only
pub async fn basic_page(State(state): State<AppState>) -> Response {
    page(&state, FrontEnd::Basic)
}

/// POST /predict
pub async fn explorer_submit(
    State(state): State<AppState>,
    form: Result<Form<PredictionRequest>, FormRejection>,
) -> Response {
    submit(&state, FrontEnd::Explorer, form)
}

/// POST /basic/predict
pub async fn basic_submit(
    State(state): State<AppState>,
    form: Result<Form<PredictionRequest>, FormRejection>,
) -> Response {
    submit(&state, FrontEnd::Basic, form)
}

fn page(state: &AppState, front_end: FrontEnd) -> Response {
    let html = render_page(front_end, &state.artifacts, None, &Outcome::Idle);
    (status_for(state), Html(html)).into_response()
}

fn submit(
    state: &AppState,
    front_end: FrontEnd,
    form: Result<Form<PredictionRequest>, FormRejection>,
) -> Response {
    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            let reason = rejection.body_text();
            tracing::debug!(error = %reason, "Rejected form submission");
            let outcome = Outcome::Failed(format!("Invalid input: {}", reason));
            let html = render_page(front_end, &state.artifacts, None, &outcome);
            return (status_for(state), Html(html)).into_response();
        }
    };
    let values = request.clone().clamped();

    // Errors stay on the page; the form remains usable for the next attempt
    let outcome = match predict(state, request) {
        Ok(result) => Outcome::Predicted(result),
        Err(e) => Outcome::Failed(e.to_string()),
    };

    let html = render_page(front_end, &state.artifacts, Some(&values), &outcome);
    (status_for(state), Html(html)).into_response()
}

/// The page itself still renders when the dataset is missing, but with 503
fn status_for(state: &AppState) -> StatusCode {
    if state.artifacts.dataset().is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
