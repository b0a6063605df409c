//! Error handling for envrender
//!
//! Every failure in envrender is terminal: a configuration renderer must never
//! emit a half-resolved artifact. Errors are therefore carried as typed values up
//! to `main`, which prints them once and exits non-zero.
//!
//! # Architecture
//!
//! - [`EnvrenderError`] - one variant per failure class (bootstrap, not-found,
//!   decode, environment selection, backend, template loading, configuration)
//! - [`ErrorContext`] - wrapper adding details and an actionable suggestion for
//!   terminal display
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] into an
//!   [`ErrorContext`], looking through template errors for the resolution error
//!   that caused them
//!
//! # Examples
//!
//! ```rust,no_run
//! use envrender::core::{EnvrenderError, user_friendly_error};
//!
//! let error = EnvrenderError::ParameterNotFound {
//!     path: "/env-bt01/fnd-name".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// The main error type for envrender operations.
///
/// Messages name the exact parameter path, secret identifier, or environment
/// involved so operators can tell configuration gaps apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvrenderError {
    /// The variable supplying the environment name is not set at all.
    #[error("Environment variable {variable} is not set")]
    MissingEnvironmentName {
        /// Name of the variable that was consulted
        variable: String,
    },

    /// The variable supplying the environment name is set to an empty string.
    #[error("Environment variable {variable} is set to an empty value")]
    EmptyEnvironmentName {
        /// Name of the variable that was consulted
        variable: String,
    },

    /// The foundation name parameter resolved to an empty value.
    #[error("Cannot determine the foundation name: parameter {path} is empty")]
    EmptyFoundationName {
        /// Parameter path that held the empty value
        path: String,
    },

    /// The organization name parameter resolved to an empty value.
    #[error("Cannot determine the organization name: parameter {path} is empty")]
    EmptyOrganizationName {
        /// Parameter path that held the empty value
        path: String,
    },

    /// A parameter path does not exist in the parameter backend.
    #[error("Cannot find parameter called {path}")]
    ParameterNotFound {
        /// Fully-qualified parameter path
        path: String,
    },

    /// A secret identifier does not exist in the secret backend.
    #[error("Cannot find secret called \"{name}\"")]
    SecretNotFound {
        /// Backend secret identifier
        name: String,
    },

    /// A secret exists but its payload is not a JSON document.
    #[error("Found secret \"{name}\" but cannot decode it as JSON: {reason}")]
    SecretDecode {
        /// Backend secret identifier
        name: String,
        /// Decoder message
        reason: String,
    },

    /// `by_env` had neither a value for the current environment nor a default.
    #[error("No value provided for environment \"{environment}\" and no default provided either")]
    EnvironmentSelection {
        /// The current environment name
        environment: String,
    },

    /// A backend failed for a reason other than a missing key.
    #[error("Backend operation failed: {operation}: {reason}")]
    Backend {
        /// What was being attempted, e.g. `ssm get-parameter /env-bt01/fnd-name`
        operation: String,
        /// Underlying failure
        reason: String,
    },

    /// The template file given on the command line does not exist.
    #[error("Template file not found: {path}")]
    TemplateNotFound {
        /// Path as given by the operator
        path: String,
    },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a displayable error
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes, in order:
/// - [`EnvrenderError`] anywhere in the chain
/// - [`TemplateError`], unwrapping a failed template function to its cause
/// - [`std::io::Error`] and [`toml::de::Error`]
/// - anything else, with its full cause chain
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        if let Some(cause) = template_error.resolution_error() {
            return create_error_context(cause.clone())
                .with_details(template_error.format_with_context());
        }
        return ErrorContext::new(template_error)
            .with_details(template_error.format_with_context())
            .with_suggestion(
                "Expressions use <<< >>>, blocks use <<% %>>, comments use <<# #>>. \
                 Every referenced name must be one of the bound functions or constants",
            );
    }

    if let Some(envrender_error) =
        error.chain().find_map(|cause| cause.downcast_ref::<EnvrenderError>())
    {
        return create_error_context(envrender_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(io_error)
                .with_suggestion("Check the file permissions of the template and the store file");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(EnvrenderError::Config {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the envrender configuration file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(message)
}

/// Map each [`EnvrenderError`] variant to a context with tailored suggestions.
fn create_error_context(error: EnvrenderError) -> ErrorContext {
    match &error {
        EnvrenderError::MissingEnvironmentName {
            variable,
        }
        | EnvrenderError::EmptyEnvironmentName {
            variable,
        } => {
            let hint = format!("Set {variable} to the target environment, e.g. {variable}=bt01");
            ErrorContext::new(error).with_suggestion(hint)
        }
        EnvrenderError::EmptyFoundationName {
            ..
        } => ErrorContext::new(error)
            .with_details("The foundation name is read from /env-<environment>/fnd-name")
            .with_suggestion("Store the foundation name for this environment in the parameter store"),
        EnvrenderError::EmptyOrganizationName {
            ..
        } => ErrorContext::new(error)
            .with_details("The organization name is read from /fnd-<foundation>/org-name")
            .with_suggestion("Store the organization name for this foundation in the parameter store"),
        EnvrenderError::ParameterNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the parameter exists in the selected backend and region"),
        EnvrenderError::SecretNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the secret identifier stored under secrets-manager/* is current"),
        EnvrenderError::SecretDecode {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Secret payloads must be JSON text, as stored by `aws secretsmanager create-secret --secret-string`"),
        EnvrenderError::EnvironmentSelection {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add a value for this environment or a default=... argument to by_env"),
        EnvrenderError::Backend {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check that the aws CLI is installed and that credentials for the target account are active",
        ),
        EnvrenderError::TemplateNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Template paths are resolved relative to the current directory"),
        EnvrenderError::Config {
            ..
        } => ErrorContext::new(error),
    }
}
