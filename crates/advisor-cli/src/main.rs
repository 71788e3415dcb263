use std::path::PathBuf;

use advisor_application::build_service;
use advisor_core::config::{AppConfig, TransportKind};
use advisor_core::conversation::TransportConvention;
use advisor_core::secret::SecretService;
use advisor_infrastructure::{AdvisorPaths, ConfigStorage, SecretServiceImpl};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod helper;
mod repl;

#[derive(Parser)]
#[command(name = "watch-advisor")]
#[command(about = "Chat with a watch collection advisor backed by Gemini", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.config/watch-advisor/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model id, e.g. gemini-2.5-flash
    #[arg(long)]
    model: Option<String>,

    /// Wire adapter: gemini or flattened
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Instruction placement: separate or inline
    #[arg(long)]
    convention: Option<TransportConvention>,

    /// Let the model consult web search (`--grounding false` turns it off)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    grounding: Option<bool>,

    /// Start without the assistant greeting
    #[arg(long)]
    no_greeting: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(convention) = self.convention {
            config.convention = convention;
        }
        if let Some(grounding) = self.grounding {
            config.grounding = grounding;
        }
        if self.no_greeting {
            config.greeting = false;
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let storage = match &cli.config {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let mut config = storage
        .load()
        .await
        .with_context(|| format!("Failed to load {}", storage.path().display()))?;
    cli.apply(&mut config);

    let secrets = SecretServiceImpl::from_env()?;
    if !secrets.secret_file_exists().await {
        match AdvisorPaths::ensure_secret_file() {
            Ok(path) => eprintln!(
                "{}",
                format!(
                    "No API key found. Set GOOGLE_API_KEY or fill in {}",
                    path.display()
                )
                .yellow()
            ),
            Err(err) => tracing::warn!(error = %err, "Could not create secret file template"),
        }
    }

    let service = build_service(&config, &secrets).await?;
    repl::run(service).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "watch-advisor",
            "--model",
            "gemini-2.5-pro",
            "--transport",
            "flattened",
            "--convention",
            "inline",
            "--grounding",
            "--no-greeting",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.transport, TransportKind::Flattened);
        assert_eq!(config.convention, TransportConvention::InlineHistory);
        assert!(config.grounding);
        assert!(!config.greeting);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["watch-advisor"]);
        let mut config = AppConfig {
            grounding: true,
            ..AppConfig::default()
        };
        cli.apply(&mut config);
        assert_eq!(config, AppConfig {
            grounding: true,
            ..AppConfig::default()
        });
    }

    #[test]
    fn test_grounding_false_overrides_config() {
        let cli = Cli::parse_from(["watch-advisor", "--grounding", "false"]);
        let mut config = AppConfig {
            grounding: true,
            ..AppConfig::default()
        };
        cli.apply(&mut config);
        assert!(!config.grounding);

        let cli = Cli::parse_from(["watch-advisor", "--grounding=true"]);
        cli.apply(&mut config);
        assert!(config.grounding);
    }
}
