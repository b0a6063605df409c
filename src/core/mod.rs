//! Core types for envrender
//!
//! This module holds the error vocabulary shared by every other module:
//! - [`EnvrenderError`] - typed failures, one per class of configuration problem
//! - [`ErrorContext`] - terminal presentation with details and suggestions
//! - [`user_friendly_error`] - conversion used by `main` before exiting

pub mod error;

pub use error::{EnvrenderError, ErrorContext, user_friendly_error};
