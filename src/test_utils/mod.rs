//! Test utilities for envrender
//!
//! Provides an in-memory parameter and secret backend that counts every read,
//! plus one-time tracing setup for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use envrender::store::CachingStore;
//! use envrender::test_utils::MemoryBackend;
//!
//! let backend = Arc::new(
//!     MemoryBackend::new()
//!         .with_parameter("/env-bt01/fnd-name", "acme")
//!         .with_secret("acme/db", r#"{"password":"x"}"#),
//! );
//! let store = CachingStore::new(backend.clone(), backend.clone());
//! assert_eq!(store.fetch_parameter("/env-bt01/fnd-name").unwrap(), "acme");
//! assert_eq!(backend.parameter_reads("/env-bt01/fnd-name"), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, Once, PoisonError};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::store::{BackendError, ParameterBackend, SecretBackend};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set that level is used,
/// otherwise `RUST_LOG` is honored, and with neither nothing is logged.
///
/// ```bash
/// RUST_LOG=store=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// In-memory [`ParameterBackend`] and [`SecretBackend`].
///
/// Every call to the backend is counted per key, so tests can assert that the
/// caching layer above it reads each key at most once.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    parameters: HashMap<String, String>,
    secrets: HashMap<String, String>,
    failures: HashMap<String, String>,
    reads: Mutex<ReadLog>,
}

#[derive(Debug, Default)]
struct ReadLog {
    parameters: HashMap<String, usize>,
    secrets: HashMap<String, usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a parameter value verbatim.
    #[must_use]
    pub fn with_parameter(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(path.into(), value.into());
        self
    }

    /// Store a secret's raw payload.
    #[must_use]
    pub fn with_secret(mut self, secret_id: impl Into<String>, payload: impl Into<String>) -> Self {
        self.secrets.insert(secret_id.into(), payload.into());
        self
    }

    /// Make reads of `key` (parameter path or secret id) fail as an outage would.
    #[must_use]
    pub fn failing(mut self, key: impl Into<String>, reason: impl Into<String>) -> Self {
        self.failures.insert(key.into(), reason.into());
        self
    }

    /// How many times the parameter at `path` was requested.
    pub fn parameter_reads(&self, path: &str) -> usize {
        self.log().parameters.get(path).copied().unwrap_or(0)
    }

    /// How many times the secret `secret_id` was requested.
    pub fn secret_reads(&self, secret_id: &str) -> usize {
        self.log().secrets.get(secret_id).copied().unwrap_or(0)
    }

    fn log(&self) -> std::sync::MutexGuard<'_, ReadLog> {
        self.reads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(&self, operation: &str, key: &str) -> Result<(), BackendError> {
        match self.failures.get(key) {
            Some(reason) => Err(BackendError::Failed {
                operation: format!("{operation} {key}"),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ParameterBackend for MemoryBackend {
    fn get_parameter(&self, path: &str) -> Result<String, BackendError> {
        *self.log().parameters.entry(path.to_string()).or_default() += 1;
        self.check_failure("get parameter", path)?;
        self.parameters.get(path).cloned().ok_or_else(|| BackendError::NotFound {
            key: path.to_string(),
        })
    }
}

impl SecretBackend for MemoryBackend {
    fn get_secret(&self, secret_id: &str) -> Result<String, BackendError> {
        *self.log().secrets.entry(secret_id.to_string()).or_default() += 1;
        self.check_failure("get secret", secret_id)?;
        self.secrets.get(secret_id).cloned().ok_or_else(|| BackendError::NotFound {
            key: secret_id.to_string(),
        })
    }
}
