use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "charges-predictor", version, about = "Medical insurance charges prediction")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web front-ends (default)
    Serve,

    /// Load the configuration and both artifacts, then report their status
    Check,

    /// Predict charges for one set of inputs
    Predict(PredictArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[arg(long, default_value_t = 30)]
    pub age: i64,

    #[arg(long)]
    pub sex: String,

    #[arg(long, default_value_t = 25.0)]
    pub bmi: f64,

    #[arg(long, default_value_t = 0)]
    pub children: i64,

    #[arg(long)]
    pub smoker: String,

    #[arg(long)]
    pub region: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };
        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_predict() {
        let args = vec![
            "charges-predictor",
            "predict",
            "--sex",
            "female",
            "--smoker",
            "no",
            "--region",
            "southwest",
            "--bmi",
            "31.5",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Predict(args) => {
                assert_eq!(args.age, 30);
                assert_eq!(args.bmi, 31.5);
                assert_eq!(args.children, 0);
                assert_eq!(args.region, "southwest");
            }
            _ => panic!("Expected Predict command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_config() {
        let args = vec!["charges-predictor", "check", "--config", "/etc/predictor.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/predictor.toml"));
        assert!(matches!(cli.get_command(), Commands::Check));
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["charges-predictor", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_predict_requires_categorical_fields() {
        let args = vec!["charges-predictor", "predict", "--sex", "male"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
