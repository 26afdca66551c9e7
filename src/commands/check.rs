use anyhow::{bail, Result};
use charges_predictor::{artifacts::Artifacts, config::Config};
use colored::Colorize;
use tracing::info;

/// Execute the check command
///
/// Loads both artifacts the way the server does and prints a summary.
/// Fails when either artifact cannot be loaded.
pub fn execute(cfg: &Config) -> Result<()> {
    println!("{}", "Checking artifacts...".yellow());
    info!("Loading artifacts for check");

    let artifacts = Artifacts::load(&cfg.artifacts);

    println!();
    println!("{}", "Artifact Summary:".bold());

    match artifacts.dataset() {
        Ok(dataset) => {
            println!(
                "  {}: {} ({} rows, {} columns)",
                "Dataset".cyan(),
                "loaded".green(),
                dataset.row_count(),
                dataset.columns().len()
            );
            println!("    Numeric: {}", dataset.numeric_columns().join(", "));
            println!("    Categorical: {}", dataset.categorical_columns().join(", "));
        }
        Err(failure) => {
            println!("  {}: {}", "Dataset".cyan(), "failed".red());
            println!("    {}", failure);
        }
    }

    match artifacts.model() {
        Ok(model) => {
            println!(
                "  {}: {} ({} v{})",
                "Model".cyan(),
                "loaded".green(),
                model.name(),
                model.version()
            );
        }
        Err(failure) => {
            println!("  {}: {}", "Model".cyan(), "failed".red());
            println!("    {}", failure);
        }
    }
    println!();

    if !artifacts.is_ready() {
        bail!("One or more artifacts failed to load");
    }

    println!("{}", "✓ All artifacts loaded".green());
    info!("Artifact check completed successfully");
    Ok(())
}
