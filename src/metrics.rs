use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!("predictions_total", "Total number of prediction submissions");
    describe_histogram!(
        "prediction_duration_seconds",
        "Time spent in a single inference call"
    );
    describe_counter!("chart_requests_total", "Total number of chart computations");
    describe_gauge!(
        "artifact_loaded",
        "Whether a startup artifact loaded successfully (1) or failed (0)"
    );
    describe_gauge!(
        "charges_predictor_info",
        "Service version and build information"
    );

    gauge!("charges_predictor_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one prediction attempt
pub fn record_prediction(outcome: &str, duration: Duration) {
    counter!("predictions_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("prediction_duration_seconds", "outcome" => outcome.to_string())
        .record(duration.as_secs_f64());
}

/// Record one chart computation
pub fn record_chart(kind: &str, outcome: &str) {
    counter!(
        "chart_requests_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

/// Record whether an artifact is available
pub fn record_artifact(artifact: &str, loaded: bool) {
    gauge!("artifact_loaded", "artifact" => artifact.to_string()).set(if loaded { 1.0 } else { 0.0 });
}
