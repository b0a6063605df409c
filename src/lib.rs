//! envrender - environment-scoped configuration templates
//!
//! Renders a template for one deployment environment, pulling parameters and
//! secrets from a hierarchical store. An environment belongs to a foundation,
//! and a foundation to an organization; values can live at any of the three
//! levels.
//!
//! # Architecture Overview
//!
//! ```text
//! ENV_NAME ──► context (bootstrap) ──► resolver ──► templating ──► stdout
//!                         │                │
//!                         └──── store (CachingStore) ──► aws | file backends
//! ```
//!
//! # Core Modules
//!
//! - [`cli`] - Argument parsing, logging setup, and the render command
//! - [`config`] - Layered TOML configuration
//! - [`constants`] - Well-known keys, variables, and delimiters
//! - [`context`] - Environment → foundation → organization bootstrap
//! - [`core`] - Error types and user-facing error formatting
//! - [`resolver`] - Scoped parameter paths and secret bundles
//! - [`selector`] - Per-environment value selection behind `by_env`
//! - [`store`] - Backends and the single-read caching layer
//! - [`templating`] - The MiniJinja environment, bound names, and rendering
//!
//! # Template Example
//!
//! ```text
//! <<# .env.deployment.j2 #>>
//! ENVIRONMENT=<<< env_name >>>
//! API_URL=<<< env_param('api-url') >>>
//! DB_PASSWORD=<<< database_secret().password >>>
//! LOG_LEVEL=<<< by_env(production='warn', default='debug') >>>
//! <<% if environmental_vars('CI') %>>CI=true<<% endif %>>
//! ```
//!
//! ```bash
//! ENV_NAME=bt01 envrender .env.deployment.j2 > .env
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod core;
pub mod resolver;
pub mod selector;
pub mod store;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
