//! Template rendering for environment-scoped configuration files.
//!
//! Templates are MiniJinja templates with remapped delimiters so that the
//! `{{ }}` and `{% %}` sequences common in configuration files pass through
//! untouched:
//!
//! | Purpose | Delimiters |
//! |---------|------------|
//! | Expression | `<<< ... >>>` |
//! | Statement | `<<% ... %>>` |
//! | Comment | `<<# ... #>>` |
//!
//! Undefined names are errors. The only names available are those in
//! [`BOUND_NAMES`] plus anything the template assigns itself.
//!
//! # Example
//!
//! ```text
//! DATABASE_URL=postgres://<<< database_secret().username >>>@<<< fnd_param('db-host') >>>/app
//! LOG_LEVEL=<<< by_env(production='warn', default='debug') >>>
//! <<% include 'common.env' %>>
//! ```
//!
//! Included files resolve relative to the renderer's base directory and use
//! the same delimiters.

pub mod error;
pub mod registry;
pub mod renderer;

pub use error::{ErrorLocation, TemplateError};
pub use registry::{BOUND_NAMES, TemplateFunctionRegistry};
pub use renderer::{TemplateRenderer, delimiter_syntax};
