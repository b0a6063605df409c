//! Integration test suite for envrender
//!
//! These tests run the compiled binary against a JSON file store in a
//! temporary directory, so no AWS access is needed.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: argument handling, exit codes, and the environment name variable
//! - **rendering**: delimiters, bound names, includes, and stdout content
//! - **error_scenarios**: bootstrap failures, missing keys, and decode errors

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod error_scenarios;
mod rendering;
