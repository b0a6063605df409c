//! Parameter and secret backends.
//!
//! Templates read two kinds of remote configuration: scalar parameters addressed
//! by hierarchical paths (`/env-bt01/fnd-name`) and secrets addressed by an opaque
//! identifier whose payload is JSON text. Each kind sits behind its own trait so
//! the [`CachingStore`] can memoize them independently and tests can substitute
//! in-memory implementations.
//!
//! Two implementations ship with the crate:
//! - [`aws`] - shells out to the system `aws` binary (SSM Parameter Store and
//!   Secrets Manager); credentials stay the CLI's concern
//! - [`file`] - a JSON document on disk, for local development and offline renders

pub mod aws;
pub mod cache;
pub mod file;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

pub use aws::{AwsCli, AwsParameterBackend, AwsSecretBackend};
pub use cache::{CacheStats, CachingStore};
pub use file::FileStore;

use crate::config::{BackendKind, RenderConfig};
use crate::core::EnvrenderError;

/// Failure reported by a backend read.
///
/// `NotFound` must be distinguishable from every other failure: the caching layer
/// turns it into a precise "cannot find" error naming the key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The key does not exist in the backend.
    #[error("{key} not found")]
    NotFound {
        /// The path or identifier that was requested
        key: String,
    },

    /// Any other failure: transport, permissions, missing tooling.
    #[error("{operation} failed: {reason}")]
    Failed {
        /// Description of the attempted read
        operation: String,
        /// What went wrong
        reason: String,
    },
}

impl BackendError {
    /// Convert a non-`NotFound` failure into the crate error type.
    pub(crate) fn into_backend_failure(self) -> EnvrenderError {
        match self {
            BackendError::NotFound {
                key,
            } => EnvrenderError::Backend {
                operation: format!("read {key}"),
                reason: "not found".to_string(),
            },
            BackendError::Failed {
                operation,
                reason,
            } => EnvrenderError::Backend {
                operation,
                reason,
            },
        }
    }
}

/// Read access to a hierarchical key/value parameter store.
pub trait ParameterBackend: Send + Sync + fmt::Debug {
    /// Return the value stored at `path`, verbatim.
    fn get_parameter(&self, path: &str) -> Result<String, BackendError>;
}

/// Read access to a secret store holding JSON payloads.
pub trait SecretBackend: Send + Sync + fmt::Debug {
    /// Return the raw payload of the secret `id`; decoding is the caller's job.
    fn get_secret(&self, id: &str) -> Result<String, BackendError>;
}

/// Build the parameter and secret backends selected by `config`.
pub fn open_backends(
    config: &RenderConfig,
) -> Result<(Arc<dyn ParameterBackend>, Arc<dyn SecretBackend>)> {
    match config.backend {
        BackendKind::Aws => {
            let cli = AwsCli::from_config(config)?;
            tracing::debug!("Using aws CLI backends ({})", cli.program().display());
            let parameters: Arc<dyn ParameterBackend> =
                Arc::new(AwsParameterBackend::new(cli.clone()));
            let secrets: Arc<dyn SecretBackend> = Arc::new(AwsSecretBackend::new(cli));
            Ok((parameters, secrets))
        }
        BackendKind::File => {
            let path = config.store_file.as_ref().ok_or_else(|| EnvrenderError::Config {
                message: "the file backend requires a store file (--store or store_file)"
                    .to_string(),
            })?;
            let store = Arc::new(FileStore::load(path)?);
            tracing::debug!("Using file store {}", path.display());
            let parameters: Arc<dyn ParameterBackend> = store.clone();
            let secrets: Arc<dyn SecretBackend> = store;
            Ok((parameters, secrets))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_requires_store_file() {
        let config = RenderConfig {
            backend: BackendKind::File,
            store_file: None,
            ..RenderConfig::default()
        };

        let err = open_backends(&config).unwrap_err();
        match err.downcast_ref::<EnvrenderError>() {
            Some(EnvrenderError::Config {
                message,
            }) => assert!(message.contains("requires a store file"), "unexpected message: {message}"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_file_backend_serves_both_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"parameters": {"/env-bt01/fnd-name": "acme"}, "secrets": {"acme/db": {"user": "app"}}}"#,
        )
        .unwrap();

        let config = RenderConfig {
            backend: BackendKind::File,
            store_file: Some(path),
            ..RenderConfig::default()
        };
        let (parameters, secrets) = open_backends(&config).unwrap();

        assert_eq!(parameters.get_parameter("/env-bt01/fnd-name").unwrap(), "acme");
        assert_eq!(secrets.get_secret("acme/db").unwrap(), r#"{"user":"app"}"#);
    }
}
