/// End-to-end tests against the artifacts shipped in `data/`
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use charges_predictor::{
    artifacts::Artifacts,
    config::{self, ArtifactsConfig},
    handlers::AppState,
    model::{ModelArtifact, Predictor},
    prediction::{run_prediction, PredictionRequest},
    server::create_router,
};
use std::path::PathBuf;
use tower::ServiceExt;

fn shipped_artifacts() -> ArtifactsConfig {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    ArtifactsConfig {
        dataset_path: root.join("data/cleaned_data.csv"),
        model_path: root.join("data/charges_model.json"),
    }
}

fn reference_request() -> PredictionRequest {
    PredictionRequest {
        age: 30,
        sex: "female".to_string(),
        bmi: 25.0,
        children: 0,
        smoker: "no".to_string(),
        region: "southwest".to_string(),
    }
}

#[test]
fn test_shipped_config_is_valid() {
    let cfg = config::load_config(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.toml")).unwrap();
    assert_eq!(cfg.artifacts.model_path, PathBuf::from("data/charges_model.json"));
}

#[test]
fn test_shipped_artifacts_load() {
    let artifacts = Artifacts::load(&shipped_artifacts());
    assert!(artifacts.is_ready());

    let dataset = artifacts.dataset().unwrap();
    assert!(dataset.row_count() > 0);
    for column in ["age", "bmi", "children", "charges"] {
        assert!(dataset.numeric_columns().iter().any(|c| c == column), "{column} should be numeric");
    }
    for column in ["sex", "smoker", "region"] {
        assert!(dataset.categorical_columns().iter().any(|c| c == column), "{column} should be categorical");
    }
}

#[test]
fn test_reference_scenario_with_shipped_model() {
    let model = ModelArtifact::load(&shipped_artifacts().model_path).unwrap();
    assert_eq!(model.name(), "charges-linear");

    let first = run_prediction(&model, reference_request()).unwrap();
    let second = run_prediction(&model, reference_request()).unwrap();

    assert!(first.prediction >= 0.0);
    assert_eq!(first, second);
    assert!(first.display().starts_with("$ "));
    assert_eq!(first.display().rsplit('.').next().unwrap().len(), 2);
}

#[tokio::test]
async fn test_submit_then_resubmit_through_router() {
    let app = create_router(AppState::new(Artifacts::load(&shipped_artifacts())), None);

    let idle = app
        .clone()
        .oneshot(Request::builder().uri("/basic").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let idle = to_bytes(idle.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&idle).contains("<div id=\"prediction-output\"></div>"));

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&reference_request()).unwrap()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        outputs.push(value["display"].as_str().unwrap().to_string());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_chart_selection_only_touches_its_own_chart() {
    let app = create_router(AppState::new(Artifacts::load(&shipped_artifacts())), None);

    let fetch = |uri: &'static str| {
        let app = app.clone();
        async move {
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            serde_json::from_slice::<serde_json::Value>(&body).unwrap()
        }
    };

    let bivariate_before = fetch("/api/charts/bivariate?x=age&y=charges&color=smoker").await;
    let age = fetch("/api/charts/univariate?column=age").await;
    let bmi = fetch("/api/charts/univariate?column=bmi").await;
    let bivariate_after = fetch("/api/charts/bivariate?x=age&y=charges&color=smoker").await;

    assert_ne!(age["title"], bmi["title"]);
    assert_eq!(bivariate_before, bivariate_after);
}
