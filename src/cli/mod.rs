//! Command-line interface for envrender.
//!
//! ```bash
//! ENV_NAME=bt01 envrender .env.deployment.j2 > .env
//! ENV_NAME=bt01 envrender --backend file --store store.json app.conf.j2
//! ```
//!
//! The rendered template goes to stdout and nothing else does. Logs and errors
//! go to stderr, so the output can be redirected straight into a file. On any
//! failure nothing is written to stdout and the exit status is non-zero.
//!
//! # Logging
//!
//! | Flag | Level |
//! |------|-------|
//! | (none) | `warn` |
//! | `-v`, `--verbose` | `debug` |
//! | `-q`, `--quiet` | `error` |
//!
//! `RUST_LOG` takes precedence over all of them when set.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{BackendKind, ConfigOverrides, RenderConfig};
use crate::constants::CONFIG_PATH_VAR;
use crate::context::environment_name_from_env;
use crate::resolver::HierarchicalResolver;
use crate::store::{CachingStore, open_backends};
use crate::templating::{TemplateFunctionRegistry, TemplateRenderer};

/// Render an environment-scoped template to stdout.
///
/// The environment is named by `ENV_NAME`; its foundation and organization are
/// looked up in the parameter store, and the template reads parameters and
/// secrets scoped to any of the three.
#[derive(Debug, Parser)]
#[command(
    name = "envrender",
    about = "Render environment-scoped configuration templates",
    version,
    long_about = "Renders a template using <<< >>> expressions, <<% %>> statements and \
                  <<# #>> comments, resolving parameters and secrets for the environment \
                  named by ENV_NAME."
)]
pub struct Cli {
    /// Template to render, relative to the current directory.
    pub template: PathBuf,

    /// Enable debug logging on stderr.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file (default: `<config dir>/envrender/config.toml`).
    #[arg(long, env = CONFIG_PATH_VAR, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where parameters and secrets come from.
    #[arg(long, env = "ENVRENDER_BACKEND", value_enum)]
    pub backend: Option<BackendKind>,

    /// JSON store file for the `file` backend.
    #[arg(long = "store", env = "ENVRENDER_STORE", value_name = "PATH")]
    pub store_file: Option<PathBuf>,

    /// AWS region for the `aws` backend.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS named profile for the `aws` backend.
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,
}

impl Cli {
    /// Set up logging, render the template, and print it.
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level());
        let rendered = self.render()?;

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}").context("Failed to write rendered template")?;
        stdout.flush().context("Failed to write rendered template")?;
        Ok(())
    }

    /// Resolve configuration and render the template without printing it.
    pub fn render(&self) -> Result<String> {
        let config = self.load_config()?;
        let environment_name = environment_name_from_env(&config.env_var)?;
        tracing::debug!("Rendering {} for environment {}", self.template.display(), environment_name);

        let (parameters, secrets) = open_backends(&config)?;
        let store = Arc::new(CachingStore::new(parameters, secrets));
        let resolver = Arc::new(HierarchicalResolver::bootstrap(store, environment_name)?);

        let base_dir =
            std::env::current_dir().context("Failed to determine the current directory")?;
        let renderer = TemplateRenderer::new(TemplateFunctionRegistry::new(resolver), base_dir);
        renderer.render_file(&self.template)
    }

    /// File layer plus command line overrides.
    pub fn load_config(&self) -> Result<RenderConfig> {
        let config = RenderConfig::load(self.config.as_deref())?;
        Ok(config.with_overrides(ConfigOverrides {
            backend: self.backend,
            store_file: self.store_file.clone(),
            aws_region: self.region.clone(),
            aws_profile: self.profile.clone(),
        }))
    }

    /// Level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_positional_template() {
        let cli = Cli::try_parse_from(["envrender", "app.env.j2"]).unwrap();
        assert_eq!(cli.template, PathBuf::from("app.env.j2"));
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_template_is_required() {
        let err = Cli::try_parse_from(["envrender"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_positional_rejected() {
        let err = Cli::try_parse_from(["envrender", "a.j2", "b.j2"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["envrender", "-v", "-q", "t"]).is_err());
        assert_eq!(Cli::try_parse_from(["envrender", "-q", "t"]).unwrap().log_level(), "error");
        assert_eq!(Cli::try_parse_from(["envrender", "-v", "t"]).unwrap().log_level(), "debug");
    }

    #[test]
    fn test_overrides_reach_config() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "backend = \"aws\"\naws_region = \"us-east-1\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "envrender",
            "--config",
            config_path.to_str().unwrap(),
            "--backend",
            "file",
            "--store",
            "store.json",
            "--region",
            "eu-west-1",
            "t.j2",
        ])
        .unwrap();
        let config = cli.load_config().unwrap();

        assert_eq!(config.backend, BackendKind::File);
        assert_eq!(config.store_file, Some(PathBuf::from("store.json")));
        assert_eq!(config.aws_region.as_deref(), Some("eu-west-1"));
    }
}
