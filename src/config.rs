//! Configuration for the web-form variant.
//!
//! `defaults/packy.default.toml` is embedded into the binary; a file named by
//! the `PACKY_CONFIG` environment variable is layered on top when present.
//! A missing variable or file is silently ignored. An empty `secret_key` is
//! fatal: the server refuses to start without one.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/packy.default.toml");

/// Environment variable naming the optional override file.
pub const CONFIG_ENV_VAR: &str = "PACKY_CONFIG";

/// Top-level configuration for `packy-web`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub secret_key: String,
}

/// Helper for layering overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful in tests).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder, deserialize, and enforce the secret-key check.
    pub fn build(self) -> Result<WebConfig, ConfigError> {
        let config: WebConfig = self.builder.build()?.try_deserialize()?;
        if config.server.secret_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "no secret_key set for the web server".to_string(),
            ));
        }
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration the way the `packy-web` binary does: defaults layered
/// under the file named by [`CONFIG_ENV_VAR`], when set.
pub fn load() -> Result<WebConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        loader = loader.with_optional_file(path);
    }
    loader.build()
}
