// Configuration loading: optional TOML file, then STEWARD__* environment overrides

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use std::path::PathBuf;
use steward_core::StewardConfig;

pub const DEFAULT_CONFIG_PATH: &str = "~/.steward/steward.toml";

/// Config file location (`STEWARD_CONFIG`, tilde-expanded)
pub fn config_path() -> PathBuf {
    let raw = std::env::var("STEWARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

pub fn load() -> Result<StewardConfig> {
    let path = config_path();
    let builder = Config::builder().add_source(File::from(path.clone()).required(false));
    finish(builder).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<StewardConfig> {
    let config: StewardConfig = builder
        .add_source(
            Environment::with_prefix("STEWARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use tokio_test::{assert_err, assert_ok};

    fn from_toml(text: &str) -> Result<StewardConfig> {
        finish(Config::builder().add_source(File::from_str(text, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_when_file_is_empty() {
        let config = assert_ok!(from_toml(""));
        assert_eq!(config, StewardConfig::default());
    }

    #[test]
    fn test_reads_manual_queues() {
        let config = from_toml(
            r#"
            default_queue = "FALLBACK"
            auto_naming = false
            scan_base_package = "shop::pizza"

            [[queues]]
            name = "KITCHEN_QUEUE"
            activities = ["KitchenActivitiesImpl"]

            [[queues]]
            name = "PIZZA_QUEUE"
            workflows = ["PizzaWorkflowImpl"]
            "#,
        )
        .unwrap();

        assert_eq!(config.default_queue, "FALLBACK");
        assert!(!config.auto_naming);
        assert!(config.auto_pilot);
        assert_eq!(config.scan_base_package.as_deref(), Some("shop::pizza"));
        assert_eq!(config.queues.len(), 2);
        assert_eq!(config.queues[0].activities, vec!["KitchenActivitiesImpl"]);
        assert!(config.queues[0].workflows.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert_err!(from_toml(r#"default_queue = " ""#));
        assert_err!(from_toml("[[queues]]\nname = \"\""));
    }
}
