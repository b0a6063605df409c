//! Process-lifetime memoization of parameter and secret reads.
//!
//! A render may reference the same parameter or secret many times (every
//! `fnd_param(...)` call goes through `/fnd-<foundation>/...`, every field of a
//! secret bundle re-resolves the bundle). [`CachingStore`] guarantees that each
//! distinct key reaches its backend at most once for the lifetime of the store.
//!
//! # Concurrency
//!
//! Each key owns a slot (`Arc<Mutex<Option<T>>>`) held in a [`DashMap`]. A fetch
//! locks only its own slot, so concurrent requests for the same key wait for the
//! first one to finish and then read its result, while different keys proceed
//! independently. The map's shard lock is released before any backend call.
//!
//! Entries are write-once: nothing is invalidated or refreshed, and failures are
//! not cached (they are terminal for the run anyway).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use serde_json::Value;

use super::{BackendError, ParameterBackend, SecretBackend};
use crate::core::EnvrenderError;

type Slot<T> = Arc<Mutex<Option<T>>>;

/// Counters describing how the cache has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that reached the parameter backend
    pub parameter_fetches: usize,
    /// Reads that reached the secret backend
    pub secret_fetches: usize,
    /// Lookups answered from the cache
    pub hits: usize,
}

/// Lazy, write-once cache in front of a parameter backend and a secret backend.
///
/// Owned state is injected at construction; two stores never share entries.
#[derive(Debug)]
pub struct CachingStore {
    parameters: Arc<dyn ParameterBackend>,
    secrets: Arc<dyn SecretBackend>,
    parameter_cache: DashMap<String, Slot<String>>,
    secret_cache: DashMap<String, Slot<Value>>,
    parameter_fetches: AtomicUsize,
    secret_fetches: AtomicUsize,
    hits: AtomicUsize,
}

impl CachingStore {
    /// Create an empty store over the given backends.
    pub fn new(parameters: Arc<dyn ParameterBackend>, secrets: Arc<dyn SecretBackend>) -> Self {
        Self {
            parameters,
            secrets,
            parameter_cache: DashMap::new(),
            secret_cache: DashMap::new(),
            parameter_fetches: AtomicUsize::new(0),
            secret_fetches: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    /// Return the parameter stored at `path`, reading the backend on first use only.
    ///
    /// The value is returned verbatim; an empty string is a valid value here.
    ///
    /// # Errors
    ///
    /// - [`EnvrenderError::ParameterNotFound`] naming `path` when the backend has no such key
    /// - [`EnvrenderError::Backend`] for any other backend failure
    pub fn fetch_parameter(&self, path: &str) -> Result<String, EnvrenderError> {
        let slot = Self::slot(&self.parameter_cache, path);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = entry.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(target: "store", "Parameter cache hit: {}", path);
            return Ok(value.clone());
        }

        tracing::debug!(target: "store", "Fetching parameter {}", path);
        self.parameter_fetches.fetch_add(1, Ordering::Relaxed);
        let value = self.parameters.get_parameter(path).map_err(|e| match e {
            BackendError::NotFound {
                ..
            } => EnvrenderError::ParameterNotFound {
                path: path.to_string(),
            },
            other => other.into_backend_failure(),
        })?;

        *entry = Some(value.clone());
        Ok(value)
    }

    /// Return the decoded JSON payload of secret `id`, reading and decoding it once.
    ///
    /// # Errors
    ///
    /// - [`EnvrenderError::SecretNotFound`] naming `id` when the backend has no such secret
    /// - [`EnvrenderError::SecretDecode`] when the payload exists but is not JSON
    /// - [`EnvrenderError::Backend`] for any other backend failure
    pub fn fetch_secret(&self, id: &str) -> Result<Value, EnvrenderError> {
        let slot = Self::slot(&self.secret_cache, id);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = entry.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(target: "store", "Secret cache hit: {}", id);
            return Ok(value.clone());
        }

        tracing::debug!(target: "store", "Fetching secret {}", id);
        self.secret_fetches.fetch_add(1, Ordering::Relaxed);
        let raw = self.secrets.get_secret(id).map_err(|e| match e {
            BackendError::NotFound {
                ..
            } => EnvrenderError::SecretNotFound {
                name: id.to_string(),
            },
            other => other.into_backend_failure(),
        })?;

        let value: Value =
            serde_json::from_str(&raw).map_err(|e| EnvrenderError::SecretDecode {
                name: id.to_string(),
                reason: e.to_string(),
            })?;

        if let Value::Object(fields) = &value {
            tracing::debug!(target: "store", "Decoded secret {} ({} fields)", id, fields.len());
        }

        *entry = Some(value.clone());
        Ok(value)
    }

    /// Snapshot of the fetch and hit counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            parameter_fetches: self.parameter_fetches.load(Ordering::Relaxed),
            secret_fetches: self.secret_fetches.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }

    fn slot<T>(cache: &DashMap<String, Slot<T>>, key: &str) -> Slot<T> {
        if let Some(existing) = cache.get(key) {
            return Arc::clone(existing.value());
        }
        Arc::clone(cache.entry(key.to_string()).or_default().value())
    }
}
