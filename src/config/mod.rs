//! Configuration for envrender.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults (AWS backend, `aws` on `PATH`, `ENV_NAME`)
//! 2. A TOML file: `--config <path>` / `ENVRENDER_CONFIG`, otherwise
//!    `<config dir>/envrender/config.toml` when it exists
//! 3. Command line flags and their environment fallbacks
//!
//! # File Format
//!
//! ```toml
//! backend = "aws"          # or "file"
//! store_file = "store.json"
//! aws_region = "eu-west-1"
//! aws_profile = "zitcha"
//! aws_command = "aws"
//! env_var = "ENV_NAME"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_AWS_COMMAND, DEFAULT_ENV_NAME_VAR};
use crate::core::EnvrenderError;

/// Which backend pair serves parameters and secrets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SSM Parameter Store and Secrets Manager through the `aws` CLI
    #[default]
    Aws,
    /// A local JSON store file
    File,
}

/// Effective configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Backend selection
    pub backend: BackendKind,
    /// JSON store used by the file backend
    pub store_file: Option<PathBuf>,
    /// Region passed to the AWS CLI
    pub aws_region: Option<String>,
    /// Named profile passed to the AWS CLI
    pub aws_profile: Option<String>,
    /// Name or path of the AWS CLI binary
    pub aws_command: String,
    /// Environment variable holding the environment name
    pub env_var: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            store_file: None,
            aws_region: None,
            aws_profile: None,
            aws_command: DEFAULT_AWS_COMMAND.to_string(),
            env_var: DEFAULT_ENV_NAME_VAR.to_string(),
        }
    }
}

/// Values supplied on the command line; `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<BackendKind>,
    pub store_file: Option<PathBuf>,
    pub aws_region: Option<String>,
    pub aws_profile: Option<String>,
}

impl RenderConfig {
    /// Load the file layer.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(EnvrenderError::Config {
                    message: format!("config file {} does not exist", path.display()),
                }
                .into());
            }
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `<config dir>/envrender/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Apply command line values on top of this configuration.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if overrides.store_file.is_some() {
            self.store_file = overrides.store_file;
        }
        if overrides.aws_region.is_some() {
            self.aws_region = overrides.aws_region;
        }
        if overrides.aws_profile.is_some() {
            self.aws_profile = overrides.aws_profile;
        }
        self
    }
}
