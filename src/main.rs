use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use charges_predictor::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    if let cli::Commands::Version = command {
        println!("Charges Predictor v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logging follows the config file when it loads; otherwise fall back so the error is still reported
    let cfg = config::load_config(&args.config);
    match &cfg {
        Ok(cfg) => init_tracing(&cfg.server.log_level, &cfg.server.log_format),
        Err(_) => init_tracing("info", "text"),
    }
    let cfg = cfg?;

    match command {
        cli::Commands::Serve => commands::serve::execute(cfg).await?,
        cli::Commands::Check => commands::check::execute(&cfg)?,
        cli::Commands::Predict(predict_args) => commands::predict::execute(&cfg, predict_args)?,
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
            cli::ConfigCommands::Validate => commands::config::validate(&cfg)?,
        },
        cli::Commands::Version => {}
    }

    Ok(())
}
