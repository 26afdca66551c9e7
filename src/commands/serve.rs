use anyhow::Result;
use charges_predictor::{config::Config, server};
use colored::Colorize;
use tracing::info;

/// Execute the serve command
///
/// Blocks until SIGINT/SIGTERM triggers a graceful shutdown.
pub async fn execute(cfg: Config) -> Result<()> {
    println!("{}", "Starting charges predictor...".green());
    println!(
        "  Explorer: http://{}:{}/",
        cfg.server.host, cfg.server.port
    );
    println!(
        "  Basic:    http://{}:{}/basic",
        cfg.server.host, cfg.server.port
    );

    info!(
        dataset = %cfg.artifacts.dataset_path.display(),
        model = %cfg.artifacts.model_path.display(),
        "Starting charges predictor"
    );

    server::start_server(cfg).await
}
