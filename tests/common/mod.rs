//! Shared helpers for envrender integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A scratch directory holding templates, a JSON store, and a config file
/// that selects the file backend.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
}

impl TestProject {
    /// Create a project with an empty store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let project_dir = temp_dir.path().to_path_buf();

        fs::write(
            project_dir.join("config.toml"),
            "backend = \"file\"\nstore_file = \"store.json\"\n",
        )
        .unwrap();

        let project = Self {
            _temp_dir: temp_dir,
            project_dir,
        };
        project.write_store(&json!({}));
        project
    }

    /// A project whose store bootstraps `bt01` -> `acme` -> `zitcha`.
    pub fn bootstrapped() -> Self {
        let project = Self::new();
        project.write_store(&standard_store());
        project
    }

    pub fn path(&self) -> &Path {
        &self.project_dir
    }

    /// Write a template relative to the project directory.
    pub fn write_template(&self, name: &str, content: &str) {
        let path = self.project_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Replace the JSON store.
    pub fn write_store(&self, store: &Value) {
        fs::write(self.project_dir.join("store.json"), serde_json::to_string_pretty(store).unwrap())
            .unwrap();
    }

    /// The envrender binary, run in the project directory with a clean environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("envrender").unwrap();
        cmd.current_dir(&self.project_dir)
            .env_remove("ENV_NAME")
            .env_remove("ENVRENDER_BACKEND")
            .env_remove("ENVRENDER_STORE")
            .env_remove("AWS_REGION")
            .env_remove("AWS_PROFILE")
            .env_remove("RUST_LOG")
            .env("ENVRENDER_CONFIG", self.project_dir.join("config.toml"))
            .env("NO_COLOR", "1");
        cmd
    }

    /// [`command`](Self::command) with `ENV_NAME` set and `template` as the argument.
    pub fn render(&self, env_name: &str, template: &str) -> Command {
        let mut cmd = self.command();
        cmd.env("ENV_NAME", env_name).arg(template);
        cmd
    }
}

/// Parameters and secrets for environment `bt01` in foundation `acme`,
/// organization `zitcha`.
pub fn standard_store() -> Value {
    json!({
        "parameters": {
            "/env-bt01/fnd-name": "acme",
            "/fnd-acme/org-name": "zitcha",
            "/env-bt01/api-url": "https://bt01.example.com",
            "/env-bt01/empty": "",
            "/fnd-acme/region": "eu-west-1",
            "/org-zitcha/domain": "zitcha.io",
            "/env-bt01/secrets-manager/main": "bt01/main",
            "/fnd-acme/secrets-manager/main": "acme/main",
            "/fnd-acme/secrets-manager/database": "acme/db",
            "/org-zitcha/secrets-manager/main": "zitcha/main"
        },
        "secrets": {
            "bt01/main": { "api_key": "env-key" },
            "acme/main": "not json at all",
            "acme/db": { "username": "app", "password": "s3cret", "port": 5432 },
            "zitcha/main": { "sentry_dsn": "https://sentry.example.com/1" }
        }
    })
}
