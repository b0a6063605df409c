//! Template rendering engine with MiniJinja.
//!
//! This module provides the [`TemplateRenderer`] that configures MiniJinja for
//! envrender: remapped delimiters, strict undefined handling, no auto-escaping,
//! a file loader rooted at the working directory for `include`/`import`, and
//! the bound names from [`TemplateFunctionRegistry`].

use std::path::{Path, PathBuf};

use anyhow::Result;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use strsim::levenshtein;

use super::error::{ErrorLocation, TemplateError};
use super::registry::{BOUND_NAMES, TemplateFunctionRegistry};
use crate::constants::{
    BLOCK_END, BLOCK_START, COMMENT_END, COMMENT_START, VARIABLE_END, VARIABLE_START,
};
use crate::core::EnvrenderError;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Number of source lines shown on each side of an error.
const CONTEXT_LINES: usize = 3;

/// The `<<< >>>`, `<<% %>>`, `<<# #>>` delimiter set.
pub fn delimiter_syntax() -> Result<SyntaxConfig, minijinja::Error> {
    SyntaxConfig::builder()
        .block_delimiters(BLOCK_START, BLOCK_END)
        .variable_delimiters(VARIABLE_START, VARIABLE_END)
        .comment_delimiters(COMMENT_START, COMMENT_END)
        .build()
}

/// Renders templates against a [`TemplateFunctionRegistry`].
///
/// A fresh engine environment is built for each render; resolved values live in
/// the registry's store, so repeated renders reuse every fetched key.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    registry: TemplateFunctionRegistry,
    base_dir: PathBuf,
}

impl TemplateRenderer {
    /// Create a renderer whose includes resolve relative to `base_dir`.
    pub fn new(registry: TemplateFunctionRegistry, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            base_dir: base_dir.into(),
        }
    }

    /// Build a configured engine environment.
    pub fn environment(&self) -> Result<Environment<'static>, TemplateError> {
        let mut env = Environment::new();
        let syntax = delimiter_syntax().map_err(|e| TemplateError::SyntaxError {
            message: e.to_string(),
            location: Box::default(),
        })?;
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_loader(minijinja::path_loader(&self.base_dir));
        self.registry.register(&mut env);
        Ok(env)
    }

    /// Render `source`, reporting errors against `name`.
    pub fn render_str(&self, name: &str, source: &str) -> Result<String, TemplateError> {
        let env = self.environment()?;
        tracing::debug!("Rendering template {} ({} bytes)", name, source.len());

        let rendered = env
            .render_named_str(name, source, ())
            .map_err(|e| Self::parse_engine_error(&e, name, source))?;

        let stats = self.registry.resolver().store().stats();
        tracing::debug!(
            "Template rendering complete: {} parameter fetches, {} secret fetches, {} cache hits",
            stats.parameter_fetches,
            stats.secret_fetches,
            stats.hits
        );
        Ok(rendered)
    }

    /// Read and render the template at `path` (relative paths resolve against the cwd).
    pub fn render_file(&self, path: &Path) -> Result<String> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EnvrenderError::TemplateNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to read template {}", path.display())));
            }
        };

        Ok(self.render_str(&path.display().to_string(), &source)?)
    }

    /// Turn an engine error into a [`TemplateError`].
    fn parse_engine_error(error: &minijinja::Error, name: &str, source: &str) -> TemplateError {
        let in_root = error.name().is_none_or(|n| n == name);
        let location = Box::new(ErrorLocation {
            template: error.name().unwrap_or(name).to_string(),
            line_number: error.line(),
            context_lines: error
                .line()
                .filter(|_| in_root)
                .map(|line| Self::extract_context_lines(source, line, CONTEXT_LINES))
                .filter(|lines| !lines.is_empty()),
        });

        if let Some(cause) = Self::find_resolution_error(error) {
            return TemplateError::FunctionFailed {
                source: cause,
                location,
            };
        }

        match error.kind() {
            ErrorKind::SyntaxError => TemplateError::SyntaxError {
                message: Self::describe(error),
                location,
            },
            ErrorKind::UndefinedError | ErrorKind::UnknownFunction => {
                let undeclared = Self::unbound_names(source);
                let expr = error
                    .range()
                    .filter(|_| in_root)
                    .and_then(|range| source.get(range))
                    .map(str::trim)
                    .filter(|expr| !expr.is_empty());

                // A missing attribute or item on a defined value is not an unbound name.
                let variable = match expr.and_then(Self::leading_identifier) {
                    Some(ident) => undeclared.contains(&ident).then_some(ident),
                    None => undeclared.first().cloned(),
                };

                match variable {
                    Some(variable) => {
                        let suggestions = Self::find_similar_names(&variable, BOUND_NAMES);
                        TemplateError::VariableNotFound {
                            variable,
                            suggestions,
                            location,
                        }
                    }
                    None => TemplateError::RenderFailed {
                        message: match expr {
                            Some(expr) => format!("{} in `{}`", Self::describe(error), expr),
                            None => Self::describe(error),
                        },
                        location,
                    },
                }
            }
            _ => TemplateError::RenderFailed {
                message: Self::describe(error),
                location,
            },
        }
    }

    /// Names the template reads without binding or assigning them, sorted.
    fn unbound_names(source: &str) -> Vec<String> {
        let mut env = Environment::new();
        if let Ok(syntax) = delimiter_syntax() {
            env.set_syntax(syntax);
        }
        let mut names: Vec<String> = env
            .template_from_str(source)
            .map(|t| t.undeclared_variables(false).into_iter().collect())
            .unwrap_or_default();
        names.retain(|n| !BOUND_NAMES.contains(&n.as_str()));
        names.sort();
        names
    }

    /// Walk the error chain for the resolution error raised by a bound function.
    fn find_resolution_error(error: &minijinja::Error) -> Option<EnvrenderError> {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
        while let Some(err) = current {
            if let Some(cause) = err.downcast_ref::<EnvrenderError>() {
                return Some(cause.clone());
            }
            current = err.source();
        }
        None
    }

    fn describe(error: &minijinja::Error) -> String {
        error.detail().map_or_else(|| error.kind().to_string(), str::to_string)
    }

    /// The identifier an expression starts with (`db.user` -> `db`).
    fn leading_identifier(expr: &str) -> Option<String> {
        let expr = expr.trim();
        let end = expr
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_alphanumeric() || *c == '_') || (*i == 0 && c.is_ascii_digit()))
            .map_or(expr.len(), |(i, _)| i);
        (end > 0).then(|| expr[..end].to_string())
    }

    /// Find bound names close to `target` using Levenshtein distance
    fn find_similar_names(target: &str, available: &[&str]) -> Vec<String> {
        let mut scored: Vec<_> =
            available.iter().map(|name| (*name, levenshtein(target, name))).collect();

        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Extract context lines around an error location
    ///
    /// Returns up to `context_size` lines before and after the error line,
    /// along with their line numbers (1-indexed).
    fn extract_context_lines(
        content: &str,
        error_line: usize,
        context_size: usize,
    ) -> Vec<(usize, String)> {
        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();

        if error_line == 0 || error_line > total_lines {
            return Vec::new();
        }

        let start = error_line.saturating_sub(context_size + 1);
        let end = (error_line + context_size).min(total_lines);

        lines[start..end]
            .iter()
            .enumerate()
            .map(|(idx, line)| (start + idx + 1, line.to_string()))
            .collect()
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
