//! AWS backends driven through the system `aws` command.
//!
//! Like `git` for source control, the AWS CLI already owns credential discovery
//! (profiles, SSO, instance roles) and transport. Parameters are read from SSM
//! Parameter Store and secrets from Secrets Manager:
//!
//! ```text
//! aws ssm get-parameter --name /env-bt01/fnd-name --query Parameter.Value --output text
//! aws secretsmanager get-secret-value --secret-id acme/main --query SecretString --output text
//! ```
//!
//! A missing key is recognized from the service error code in stderr
//! (`ParameterNotFound`, `ResourceNotFoundException`).

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Result;

use super::{BackendError, ParameterBackend, SecretBackend};
use crate::config::RenderConfig;
use crate::core::EnvrenderError;

const PARAMETER_NOT_FOUND: &str = "ParameterNotFound";
const SECRET_NOT_FOUND: &str = "ResourceNotFoundException";

/// A located `aws` binary plus the global options passed to every call.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: Option<String>,
    profile: Option<String>,
}

impl AwsCli {
    /// Locate the configured binary on `PATH`.
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        let program = which::which(&config.aws_command).map_err(|e| EnvrenderError::Backend {
            operation: format!("locate {}", config.aws_command),
            reason: e.to_string(),
        })?;

        Ok(Self {
            program,
            region: config.aws_region.clone(),
            profile: config.aws_profile.clone(),
        })
    }

    /// Use an explicit binary path without searching `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            region: None,
            profile: None,
        }
    }

    /// Set the `--region` passed to every call.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the `--profile` passed to every call.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Path of the binary that will be executed.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn parameter_args(&self, path: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "ssm",
            "get-parameter",
            "--name",
            path,
            "--query",
            "Parameter.Value",
            "--output",
            "text",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        self.push_globals(&mut args);
        args
    }

    fn secret_args(&self, id: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "secretsmanager",
            "get-secret-value",
            "--secret-id",
            id,
            "--query",
            "SecretString",
            "--output",
            "text",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        self.push_globals(&mut args);
        args
    }

    fn push_globals(&self, args: &mut Vec<String>) {
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
    }

    /// Run one read and return stdout without its trailing newline.
    fn read(&self, args: &[String], key: &str, not_found_marker: &str) -> Result<String, BackendError> {
        let operation = format!("aws {} {} {}", args[0], args[1], key);
        tracing::debug!(target: "aws", "Executing command: {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| BackendError::Failed {
                operation: operation.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(
                target: "aws",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            return Err(classify_failure(&operation, key, &stderr, not_found_marker));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| BackendError::Failed {
            operation,
            reason: format!("output is not UTF-8: {e}"),
        })?;
        Ok(strip_trailing_newline(stdout))
    }
}

fn classify_failure(operation: &str, key: &str, stderr: &str, not_found_marker: &str) -> BackendError {
    if stderr.contains(not_found_marker) {
        BackendError::NotFound {
            key: key.to_string(),
        }
    } else {
        BackendError::Failed {
            operation: operation.to_string(),
            reason: stderr.trim().to_string(),
        }
    }
}

fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// SSM Parameter Store through the AWS CLI.
#[derive(Debug, Clone)]
pub struct AwsParameterBackend {
    cli: AwsCli,
}

impl AwsParameterBackend {
    /// Wrap a located CLI.
    pub fn new(cli: AwsCli) -> Self {
        Self {
            cli,
        }
    }
}

impl ParameterBackend for AwsParameterBackend {
    fn get_parameter(&self, path: &str) -> Result<String, BackendError> {
        self.cli.read(&self.cli.parameter_args(path), path, PARAMETER_NOT_FOUND)
    }
}

/// Secrets Manager through the AWS CLI.
#[derive(Debug, Clone)]
pub struct AwsSecretBackend {
    cli: AwsCli,
}

impl AwsSecretBackend {
    /// Wrap a located CLI.
    pub fn new(cli: AwsCli) -> Self {
        Self {
            cli,
        }
    }
}

impl SecretBackend for AwsSecretBackend {
    fn get_secret(&self, id: &str) -> Result<String, BackendError> {
        self.cli.read(&self.cli.secret_args(id), id, SECRET_NOT_FOUND)
    }
}
