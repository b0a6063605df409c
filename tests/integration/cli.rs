//! Command line handling and the environment name variable.

use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_no_arguments_is_usage_error() {
    let project = TestProject::bootstrapped();

    project
        .command()
        .env("ENV_NAME", "bt01")
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_two_templates_is_usage_error() {
    let project = TestProject::bootstrapped();
    project.write_template("a.j2", "A");
    project.write_template("b.j2", "B");

    project
        .command()
        .env("ENV_NAME", "bt01")
        .args(["a.j2", "b.j2"])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_help_lists_options() {
    let project = TestProject::new();

    project
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<TEMPLATE>"))
        .stdout(predicate::str::contains("--backend"));
}

#[test]
fn test_unset_env_name() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "X");

    project
        .command()
        .arg("t.j2")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Environment variable ENV_NAME is not set"));
}

#[test]
fn test_empty_env_name() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "X");

    project
        .render("", "t.j2")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ENV_NAME is set to an empty value"))
        .stderr(predicate::str::contains("is not set").not());
}

#[test]
fn test_env_var_name_from_config() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< env_name >>>");
    std::fs::write(
        project.path().join("config.toml"),
        "backend = \"file\"\nstore_file = \"store.json\"\nenv_var = \"DEPLOY_ENV\"\n",
    )
    .unwrap();

    project
        .command()
        .env("DEPLOY_ENV", "bt01")
        .arg("t.j2")
        .assert()
        .success()
        .stdout("bt01\n");
}

#[test]
fn test_store_flag_overrides_config() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< fnd_param('region') >>>");
    std::fs::rename(project.path().join("store.json"), project.path().join("other.json")).unwrap();

    project
        .render("bt01", "t.j2")
        .args(["--store", "other.json"])
        .assert()
        .success()
        .stdout("eu-west-1\n");
}

#[test]
fn test_missing_store_file() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "X");

    project
        .render("bt01", "t.j2")
        .args(["--store", "nope.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("store file nope.json does not exist"));
}

#[test]
fn test_missing_explicit_config() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "X");

    project
        .render("bt01", "t.j2")
        .env("ENVRENDER_CONFIG", project.path().join("missing.toml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< org_name >>>");

    project
        .render("bt01", "t.j2")
        .arg("--verbose")
        .assert()
        .success()
        .stdout("zitcha\n")
        .stderr(predicate::str::contains("foundation acme"));
}
