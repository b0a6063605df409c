//! Structured template errors
//!
//! Render failures are reported with the template name, the line, and a few
//! lines of surrounding source. When a bound function fails (a parameter that
//! does not exist, a secret that is not JSON), the [`EnvrenderError`] it raised
//! is kept intact so the operator sees the exact key.

use crate::core::EnvrenderError;

/// Template errors with location details
#[derive(Debug)]
pub enum TemplateError {
    /// A name that is neither bound nor assigned in the template.
    VariableNotFound {
        variable: String,
        suggestions: Vec<String>,
        location: Box<ErrorLocation>,
    },

    /// The template could not be parsed.
    SyntaxError {
        message: String,
        location: Box<ErrorLocation>,
    },

    /// A bound function (`env_param`, `database_secret`, `by_env`, ...) failed.
    FunctionFailed {
        source: EnvrenderError,
        location: Box<ErrorLocation>,
    },

    /// Any other evaluation failure reported by the engine.
    RenderFailed {
        message: String,
        location: Box<ErrorLocation>,
    },
}

/// Where in the template an error occurred
#[derive(Debug, Clone, Default)]
pub struct ErrorLocation {
    /// Template name (the path given on the command line, or an included name)
    pub template: String,
    /// 1-based line number, if the engine reported one
    pub line_number: Option<usize>,
    /// Source lines around the error as `(line number, text)`
    pub context_lines: Option<Vec<(usize, String)>>,
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::VariableNotFound {
                variable,
                location,
                ..
            } => {
                write!(f, "Undefined name '{}' in template {}", variable, location.template)
            }
            TemplateError::SyntaxError {
                message,
                location,
            } => {
                write!(f, "Template syntax error in {}: {}", location.template, message)
            }
            TemplateError::FunctionFailed {
                source,
                ..
            } => write!(f, "{}", source),
            TemplateError::RenderFailed {
                message,
                location,
            } => {
                write!(f, "Failed to render {}: {}", location.template, message)
            }
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::FunctionFailed {
                source,
                ..
            } => Some(source),
            _ => None,
        }
    }
}

impl TemplateError {
    /// The resolution error behind a failed function call, if that is what happened.
    pub fn resolution_error(&self) -> Option<&EnvrenderError> {
        match self {
            TemplateError::FunctionFailed {
                source,
                ..
            } => Some(source),
            _ => None,
        }
    }

    pub fn location(&self) -> &ErrorLocation {
        match self {
            TemplateError::VariableNotFound {
                location,
                ..
            }
            | TemplateError::SyntaxError {
                location,
                ..
            }
            | TemplateError::FunctionFailed {
                location,
                ..
            }
            | TemplateError::RenderFailed {
                location,
                ..
            } => location,
        }
    }

    /// Multi-line description with source context and suggestions.
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();

        match self {
            TemplateError::VariableNotFound {
                variable,
                suggestions,
                ..
            } => {
                msg.push_str(&format!("Undefined name: {}\n", variable));
                if !suggestions.is_empty() {
                    msg.push_str("Did you mean one of these?\n");
                    for suggestion in suggestions {
                        msg.push_str(&format!("  - {}\n", suggestion));
                    }
                }
            }
            TemplateError::SyntaxError {
                message,
                ..
            }
            | TemplateError::RenderFailed {
                message,
                ..
            } => {
                msg.push_str(&format!("Error: {}\n", message));
            }
            TemplateError::FunctionFailed {
                source,
                ..
            } => {
                msg.push_str(&format!("Error: {}\n", source));
            }
        }

        msg.push_str(&format_location(self.location()));
        msg
    }
}

fn format_location(location: &ErrorLocation) -> String {
    let mut msg = format!("Template: {}\n", location.template);

    if let Some(line) = location.line_number {
        msg.push_str(&format!("Line: {}\n", line));
    }

    if let Some(lines) = &location.context_lines {
        msg.push('\n');
        for (number, text) in lines {
            let marker = if Some(*number) == location.line_number {
                ">"
            } else {
                " "
            };
            msg.push_str(&format!("{} {:>4} | {}\n", marker, number, text));
        }
    }

    msg
}
