use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

use npd_api::ClientConfig;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientConfig,
    /// Where tokens are persisted; defaults to the user cache directory.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Settings {
    /// Load `npd.toml` (or the file named by `NPD_CONFIG`), then apply
    /// `NPD__SECTION__KEY` environment overrides.
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = std::env::var("NPD_CONFIG").unwrap_or_else(|_| "npd.toml".to_string());
        Self::from_sources(&config_path, config::Environment::with_prefix("NPD").separator("__"))
    }

    fn from_sources(config_path: &str, env: config::Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.client.validate()?;
        if self
            .token_file
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err("token_file must not be empty".to_string());
        }
        Ok(())
    }
}
