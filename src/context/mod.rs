//! The environment → foundation → organization identity of a run.
//!
//! Only the environment name comes from outside (an environment variable). The
//! other two are looked up through the parameter store, each step depending on
//! the previous one:
//!
//! ```text
//! ENV_NAME=bt01
//! /env-bt01/fnd-name   -> acme
//! /fnd-acme/org-name   -> zitcha
//! ```
//!
//! Emptiness is rejected for these three identifiers only; any other parameter
//! value is used verbatim, empty or not.

use crate::constants::{FOUNDATION_NAME_KEY, ORGANIZATION_NAME_KEY};
use crate::core::EnvrenderError;
use crate::resolver::{ParameterKey, Scope};
use crate::store::CachingStore;

/// Immutable identity of the environment being rendered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContext {
    environment_name: String,
    foundation_name: String,
    organization_name: String,
}

impl EnvironmentContext {
    /// Build a context from already-known names.
    pub fn new(
        environment_name: impl Into<String>,
        foundation_name: impl Into<String>,
        organization_name: impl Into<String>,
    ) -> Self {
        Self {
            environment_name: environment_name.into(),
            foundation_name: foundation_name.into(),
            organization_name: organization_name.into(),
        }
    }

    /// Resolve the foundation and organization names for `environment_name`.
    ///
    /// Both lookups go through `store`, so they are cached like any other
    /// parameter and a later `env_param('fnd-name')` costs nothing.
    pub fn bootstrap(
        store: &CachingStore,
        environment_name: impl Into<String>,
    ) -> Result<Self, EnvrenderError> {
        let environment_name = environment_name.into();

        let path = ParameterKey::compose(Scope::Environment, &environment_name, FOUNDATION_NAME_KEY);
        let foundation_name = store.fetch_parameter(path.as_str())?;
        if foundation_name.is_empty() {
            return Err(EnvrenderError::EmptyFoundationName {
                path: path.into_string(),
            });
        }

        let path = ParameterKey::compose(Scope::Foundation, &foundation_name, ORGANIZATION_NAME_KEY);
        let organization_name = store.fetch_parameter(path.as_str())?;
        if organization_name.is_empty() {
            return Err(EnvrenderError::EmptyOrganizationName {
                path: path.into_string(),
            });
        }

        tracing::info!(
            "Resolved environment {} -> foundation {} -> organization {}",
            environment_name,
            foundation_name,
            organization_name
        );

        Ok(Self::new(environment_name, foundation_name, organization_name))
    }

    /// The environment name, as supplied by the operator.
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    /// The foundation the environment belongs to.
    pub fn foundation_name(&self) -> &str {
        &self.foundation_name
    }

    /// The organization the foundation belongs to.
    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    /// The scope value for `scope`.
    pub fn name_for(&self, scope: Scope) -> &str {
        match scope {
            Scope::Environment => &self.environment_name,
            Scope::Foundation => &self.foundation_name,
            Scope::Organization => &self.organization_name,
        }
    }
}

/// Read the environment name from the process environment.
pub fn environment_name_from_env(variable: &str) -> Result<String, EnvrenderError> {
    environment_name_from(variable, |name| std::env::var(name).ok())
}

/// Read the environment name through `lookup`, telling "unset" apart from "empty".
pub fn environment_name_from(
    variable: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, EnvrenderError> {
    match lookup(variable) {
        None => Err(EnvrenderError::MissingEnvironmentName {
            variable: variable.to_string(),
        }),
        Some(value) if value.is_empty() => Err(EnvrenderError::EmptyEnvironmentName {
            variable: variable.to_string(),
        }),
        Some(value) => Ok(value),
    }
}
