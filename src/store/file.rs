//! JSON file store for local development and offline rendering.
//!
//! ```json
//! {
//!   "parameters": {
//!     "/env-bt01/fnd-name": "acme",
//!     "/fnd-acme/org-name": "zitcha",
//!     "/fnd-acme/secrets-manager/main": "acme/main"
//!   },
//!   "secrets": {
//!     "acme/main": { "api_key": "abc123" },
//!     "legacy/raw": "{\"token\": \"t\"}"
//!   }
//! }
//! ```
//!
//! A secret given as a string is served as its raw payload, so a malformed
//! string fails decoding exactly like a malformed remote secret would. Any other
//! JSON value is served re-serialized.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{BackendError, ParameterBackend, SecretBackend};
use crate::core::EnvrenderError;

/// Parameters and secrets loaded from a single JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileStore {
    #[serde(default)]
    parameters: HashMap<String, String>,
    #[serde(default)]
    secrets: HashMap<String, Value>,
}

impl FileStore {
    /// Read and parse the store at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EnvrenderError::Config {
                message: format!("store file {} does not exist", path.display()),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read store file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse store file {}", path.display()))
    }

    /// Parse a store from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl ParameterBackend for FileStore {
    fn get_parameter(&self, path: &str) -> Result<String, BackendError> {
        self.parameters.get(path).cloned().ok_or_else(|| BackendError::NotFound {
            key: path.to_string(),
        })
    }
}

impl SecretBackend for FileStore {
    fn get_secret(&self, id: &str) -> Result<String, BackendError> {
        match self.secrets.get(id) {
            Some(Value::String(raw)) => Ok(raw.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(BackendError::NotFound {
                key: id.to_string(),
            }),
        }
    }
}
