//! envrender CLI entry point
//!
//! Parses arguments, renders the template to stdout, and on failure prints a
//! user-friendly error to stderr and exits with status 1. Argument errors are
//! reported by clap with its own usage message and status 2.

use clap::Parser;
use envrender::cli::Cli;
use envrender::core::user_friendly_error;

fn main() {
    let cli = Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
