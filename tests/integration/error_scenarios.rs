//! Failures: every one exits non-zero with nothing on stdout.

use predicates::prelude::*;
use serde_json::json;

use crate::common::{TestProject, standard_store};

fn assert_fails_with(project: &TestProject, env_name: &str, template: &str, message: &str) {
    project
        .render(env_name, template)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(message));
}

#[test]
fn test_unknown_environment() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "X");

    assert_fails_with(&project, "nowhere", "t.j2", "Cannot find parameter called /env-nowhere/fnd-name");
}

#[test]
fn test_empty_foundation_name() {
    let project = TestProject::new();
    project.write_store(&json!({ "parameters": { "/env-bt01/fnd-name": "" } }));
    project.write_template("t.j2", "X");

    assert_fails_with(&project, "bt01", "t.j2", "foundation name: parameter /env-bt01/fnd-name is empty");
}

#[test]
fn test_empty_organization_name() {
    let project = TestProject::new();
    project.write_store(&json!({
        "parameters": { "/env-bt01/fnd-name": "acme", "/fnd-acme/org-name": "" }
    }));
    project.write_template("t.j2", "X");

    assert_fails_with(&project, "bt01", "t.j2", "organization name: parameter /fnd-acme/org-name is empty");
}

#[test]
fn test_missing_parameter_names_full_path() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "A=<<< env_name >>>\nB=<<< fnd_param('missing/key') >>>\n");

    assert_fails_with(&project, "bt01", "t.j2", "Cannot find parameter called /fnd-acme/missing/key");
}

#[test]
fn test_missing_secret() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< aws_secret('no/such') >>>");

    assert_fails_with(&project, "bt01", "t.j2", "Cannot find secret called \"no/such\"");
}

#[test]
fn test_undecodable_secret() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< foundation_secrets().anything >>>");

    assert_fails_with(&project, "bt01", "t.j2", "Found secret \"acme/main\" but cannot decode it as JSON");
}

#[test]
fn test_by_env_without_default() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< by_env(production='p') >>>");

    assert_fails_with(
        &project,
        "bt01",
        "t.j2",
        "No value provided for environment \"bt01\" and no default provided either",
    );
}

#[test]
fn test_undefined_name_is_an_error() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "OK=1\nBAD=<<< fnd_nam >>>\n");

    project
        .render("bt01", "t.j2")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("fnd_nam"))
        .stderr(predicate::str::contains("fnd_name"));
}

#[test]
fn test_missing_template() {
    let project = TestProject::bootstrapped();

    assert_fails_with(&project, "bt01", "absent.j2", "Template file not found: absent.j2");
}

#[test]
fn test_syntax_error() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<% if env_name %>>never closed");

    assert_fails_with(&project, "bt01", "t.j2", "syntax error");
}

#[test]
fn test_failure_after_output_prints_nothing() {
    let project = TestProject::bootstrapped();
    let mut big = String::new();
    for i in 0..200 {
        big.push_str(&format!("LINE_{i}=<<< env_param('api-url') >>>\n"));
    }
    big.push_str("LAST=<<< env_param('does-not-exist') >>>\n");
    project.write_template("t.j2", &big);

    assert_fails_with(&project, "bt01", "t.j2", "/env-bt01/does-not-exist");
}

#[test]
fn test_store_with_unknown_section_rejected() {
    let project = TestProject::new();
    let mut store = standard_store();
    store["extra"] = json!({});
    project.write_store(&store);
    project.write_template("t.j2", "X");

    assert_fails_with(&project, "bt01", "t.j2", "Failed to parse store file");
}
