//! Names exposed to templates.
//!
//! | Name | Behavior |
//! |------|----------|
//! | `by_env(**options)` | value for the current environment, else `default` |
//! | `environmental_vars(name, default=none)` | process environment variable, none when unset |
//! | `env_param(key)` / `fnd_param(key)` / `org_param(key)` | scoped parameter |
//! | `parameter_store(path)` | parameter by full path |
//! | `aws_secret(id)` | secret by backend identifier |
//! | `organization_secrets()` / `foundation_secrets()` / `environment_secrets()` | main secret bundles |
//! | `database_secret()` | the foundation's database secret |
//! | `env_name` / `fnd_name` / `org_name` | the bootstrap identifiers |
//!
//! Anything else is undefined and fails the render.

use std::sync::Arc;

use minijinja::value::Kwargs;
use minijinja::{Environment, Error, ErrorKind, Value};

use crate::core::EnvrenderError;
use crate::resolver::{HierarchicalResolver, Scope};
use crate::selector::{EnvironmentOptions, select};

/// Every name bound by [`TemplateFunctionRegistry::register`].
pub const BOUND_NAMES: &[&str] = &[
    "by_env",
    "environmental_vars",
    "env_param",
    "fnd_param",
    "org_param",
    "parameter_store",
    "aws_secret",
    "database_secret",
    "environment_secrets",
    "foundation_secrets",
    "organization_secrets",
    "env_name",
    "fnd_name",
    "org_name",
];

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Binds resolver operations and identifiers into a template environment.
#[derive(Clone)]
pub struct TemplateFunctionRegistry {
    resolver: Arc<HierarchicalResolver>,
    env_lookup: EnvLookup,
}

impl std::fmt::Debug for TemplateFunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateFunctionRegistry").field("resolver", &self.resolver).finish()
    }
}

impl TemplateFunctionRegistry {
    /// Registry reading `environmental_vars` from the process environment.
    pub fn new(resolver: Arc<HierarchicalResolver>) -> Self {
        Self {
            resolver,
            env_lookup: Arc::new(|name| {
                std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
            }),
        }
    }

    /// Replace the variable lookup behind `environmental_vars`.
    #[must_use]
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env_lookup = Arc::new(lookup);
        self
    }

    pub fn resolver(&self) -> &HierarchicalResolver {
        &self.resolver
    }

    /// Add every binding in [`BOUND_NAMES`] to `env`.
    pub fn register(&self, env: &mut Environment<'_>) {
        let context = self.resolver.context();
        env.add_global("env_name", Value::from(context.environment_name()));
        env.add_global("fnd_name", Value::from(context.foundation_name()));
        env.add_global("org_name", Value::from(context.organization_name()));

        let environment = context.environment_name().to_string();
        env.add_function("by_env", move |options: Kwargs| -> Result<Value, Error> {
            by_env(&environment, &options)
        });

        let lookup = Arc::clone(&self.env_lookup);
        env.add_function("environmental_vars", move |name: String, default: Option<Value>| {
            lookup(&name).map(Value::from).or(default).unwrap_or_else(|| Value::from(()))
        });

        self.register_scope(env, "env_param", Scope::Environment);
        self.register_scope(env, "fnd_param", Scope::Foundation);
        self.register_scope(env, "org_param", Scope::Organization);

        let resolver = Arc::clone(&self.resolver);
        env.add_function("parameter_store", move |path: String| -> Result<String, Error> {
            resolver.store().fetch_parameter(&path).map_err(into_template_error)
        });

        let resolver = Arc::clone(&self.resolver);
        env.add_function("aws_secret", move |secret_id: String| -> Result<Value, Error> {
            resolver.arbitrary_secret(&secret_id).map(to_value).map_err(into_template_error)
        });

        self.register_bundle(env, "database_secret", HierarchicalResolver::database_secret);
        self.register_bundle(env, "environment_secrets", HierarchicalResolver::environment_secrets);
        self.register_bundle(env, "foundation_secrets", HierarchicalResolver::foundation_secrets);
        self.register_bundle(env, "organization_secrets", HierarchicalResolver::organization_secrets);
    }

    fn register_scope(&self, env: &mut Environment<'_>, name: &'static str, scope: Scope) {
        let resolver = Arc::clone(&self.resolver);
        env.add_function(name, move |key: String| -> Result<String, Error> {
            resolver.get(scope, &key).map_err(into_template_error)
        });
    }

    fn register_bundle(
        &self,
        env: &mut Environment<'_>,
        name: &'static str,
        accessor: fn(&HierarchicalResolver) -> Result<serde_json::Value, EnvrenderError>,
    ) {
        let resolver = Arc::clone(&self.resolver);
        env.add_function(name, move || -> Result<Value, Error> {
            accessor(&resolver).map(to_value).map_err(into_template_error)
        });
    }
}

fn by_env(environment: &str, kwargs: &Kwargs) -> Result<Value, Error> {
    let names: Vec<String> = kwargs.args().map(str::to_string).collect();
    let mut options = EnvironmentOptions::new();
    for name in names {
        let value: Value = kwargs.get(&name)?;
        options.insert(name, value);
    }
    kwargs.assert_all_used()?;

    select(environment, &options).cloned().map_err(into_template_error)
}

fn to_value(json: serde_json::Value) -> Value {
    Value::from_serialize(&json)
}

/// Wrap a resolution failure so the renderer can recover it from the error chain.
fn into_template_error(error: EnvrenderError) -> Error {
    Error::new(ErrorKind::InvalidOperation, error.to_string()).with_source(error)
}
