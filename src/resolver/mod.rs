//! Hierarchical parameter and secret resolution.
//!
//! Parameters live under one of three scopes, each named after the current
//! environment, its foundation, or its organization:
//!
//! | Scope | Path |
//! |-------|------|
//! | [`Scope::Environment`] | `/env-<environment>/<key>` |
//! | [`Scope::Foundation`] | `/fnd-<foundation>/<key>` |
//! | [`Scope::Organization`] | `/org-<organization>/<key>` |
//!
//! Secret bundles are found in two steps: a well-known parameter holds the
//! secret identifier, and the identifier is then read from the secret backend.
//! Both steps go through the [`CachingStore`], so a bundle costs one parameter
//! read and one secret read per run no matter how many fields a template uses.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::constants::{DATABASE_SECRET_KEY, MAIN_SECRET_KEY};
use crate::context::EnvironmentContext;
use crate::core::EnvrenderError;
use crate::store::CachingStore;

/// The level of the naming hierarchy a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Environment,
    Foundation,
    Organization,
}

impl Scope {
    /// Path prefix used for this scope (`env`, `fnd`, `org`).
    pub const fn prefix(self) -> &'static str {
        match self {
            Scope::Environment => "env",
            Scope::Foundation => "fnd",
            Scope::Organization => "org",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A fully-qualified parameter path.
///
/// Two keys are equal exactly when their strings are; nothing is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterKey(String);

impl ParameterKey {
    /// Compose `/<prefix>-<scope_name>/<relative>`.
    pub fn compose(scope: Scope, scope_name: &str, relative: &str) -> Self {
        Self(format!("/{}-{}/{}", scope.prefix(), scope_name, relative))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves scoped parameters and secret bundles for one [`EnvironmentContext`].
#[derive(Debug, Clone)]
pub struct HierarchicalResolver {
    store: Arc<CachingStore>,
    context: EnvironmentContext,
}

impl HierarchicalResolver {
    /// Create a resolver over a shared store.
    pub fn new(store: Arc<CachingStore>, context: EnvironmentContext) -> Self {
        Self {
            store,
            context,
        }
    }

    /// Bootstrap the context for `environment_name` and build a resolver from it.
    pub fn bootstrap(
        store: Arc<CachingStore>,
        environment_name: impl Into<String>,
    ) -> Result<Self, EnvrenderError> {
        let context = EnvironmentContext::bootstrap(&store, environment_name)?;
        Ok(Self::new(store, context))
    }

    pub fn context(&self) -> &EnvironmentContext {
        &self.context
    }

    pub fn store(&self) -> &CachingStore {
        &self.store
    }

    /// The full path of `relative` under `scope`.
    pub fn key(&self, scope: Scope, relative: &str) -> ParameterKey {
        ParameterKey::compose(scope, self.context.name_for(scope), relative)
    }

    /// Read a scoped parameter.
    pub fn get(&self, scope: Scope, relative: &str) -> Result<String, EnvrenderError> {
        let key = self.key(scope, relative);
        tracing::trace!(target: "resolver", "{}({}) -> {}", scope, relative, key);
        self.store.fetch_parameter(key.as_str())
    }

    /// The organization's main secret bundle.
    pub fn organization_secrets(&self) -> Result<Value, EnvrenderError> {
        self.bundle(Scope::Organization, MAIN_SECRET_KEY)
    }

    /// The foundation's main secret bundle.
    pub fn foundation_secrets(&self) -> Result<Value, EnvrenderError> {
        self.bundle(Scope::Foundation, MAIN_SECRET_KEY)
    }

    /// The environment's main secret bundle.
    pub fn environment_secrets(&self) -> Result<Value, EnvrenderError> {
        self.bundle(Scope::Environment, MAIN_SECRET_KEY)
    }

    /// The foundation's database secret.
    pub fn database_secret(&self) -> Result<Value, EnvrenderError> {
        self.bundle(Scope::Foundation, DATABASE_SECRET_KEY)
    }

    /// Read a secret by backend identifier, bypassing the hierarchy.
    pub fn arbitrary_secret(&self, secret_id: &str) -> Result<Value, EnvrenderError> {
        self.store.fetch_secret(secret_id)
    }

    fn bundle(&self, scope: Scope, relative: &str) -> Result<Value, EnvrenderError> {
        let secret_id = self.get(scope, relative)?;
        self.store.fetch_secret(&secret_id)
    }
}
