//! Engine configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML file,
//! then `TASKER_CONTEXT_*` environment variables (`__` between nesting levels, e.g.
//! `TASKER_CONTEXT_LOGGING__LEVEL=warn`).

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::context::accessors::DEFAULT_FQN_SKIP_IDENTIFIERS;
use crate::error::{EngineError, EngineResult};

const ENV_PREFIX: &str = "TASKER_CONTEXT";
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub ansi: bool,
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            ansi: true,
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Render matrix strategy postfixes from values rather than combination indices
    pub use_matrix_field_name: bool,
    /// Identifiers of STEP frames left out of fully qualified names
    pub fqn_skip_identifiers: Vec<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            use_matrix_field_name: true,
            fqn_skip_identifiers: DEFAULT_FQN_SKIP_IDENTIFIERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub context: ContextConfig,
}

/// Create a Config builder with the engine defaults applied
fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = EngineConfig::default();
    Config::builder()
        .set_default("logging.level", defaults.logging.level)?
        .set_default("logging.json", defaults.logging.json)?
        .set_default("logging.ansi", defaults.logging.ansi)?
        .set_default("logging.environment", defaults.logging.environment)?
        .set_default(
            "context.use_matrix_field_name",
            defaults.context.use_matrix_field_name,
        )?
        .set_default(
            "context.fqn_skip_identifiers",
            defaults.context.fqn_skip_identifiers,
        )
}

impl EngineConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        let mut builder = builder_with_defaults()?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: EngineConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("context.fqn_skip_identifiers"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load from defaults and the environment only
    pub fn from_env() -> EngineResult<Self> {
        Self::load(None)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(EngineError::ConfigurationError(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        if self
            .context
            .fqn_skip_identifiers
            .iter()
            .any(|id| id.trim().is_empty())
        {
            return Err(EngineError::ConfigurationError(
                "fqn_skip_identifiers must not contain empty identifiers".to_string(),
            ));
        }

        Ok(())
    }
}
