//! End-to-end rendering through the binary.

use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_identifiers_and_scoped_parameters() {
    let project = TestProject::bootstrapped();
    project.write_template(
        ".env.deployment.j2",
        "<<# generated #>>ENV=<<< env_name >>>\n\
         FND=<<< fnd_name >>>\n\
         ORG=<<< org_name >>>\n\
         API=<<< env_param('api-url') >>>\n\
         REGION=<<< fnd_param('region') >>>\n\
         DOMAIN=<<< org_param('domain') >>>\n",
    );

    project.render("bt01", ".env.deployment.j2").assert().success().stdout(
        "ENV=bt01\nFND=acme\nORG=zitcha\nAPI=https://bt01.example.com\n\
         REGION=eu-west-1\nDOMAIN=zitcha.io\n",
    );
}

#[test]
fn test_literal_template_passes_through() {
    let project = TestProject::bootstrapped();
    project.write_template("plain.txt", "server {\n  listen {{ port }};\n  # {% raw %}\n}");

    project
        .render("bt01", "plain.txt")
        .assert()
        .success()
        .stdout("server {\n  listen {{ port }};\n  # {% raw %}\n}\n");
}

#[test]
fn test_empty_parameter_is_verbatim() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "[<<< env_param('empty') >>>]");

    project.render("bt01", "t.j2").assert().success().stdout("[]\n");
}

#[test]
fn test_secret_bundles_and_fields() {
    let project = TestProject::bootstrapped();
    project.write_template(
        "t.j2",
        "<<< database_secret().username >>>:<<< database_secret()['password'] >>>:<<< database_secret().port >>>\n\
         <<< environment_secrets().api_key >>>\n\
         <<< organization_secrets().sentry_dsn >>>\n\
         <<< aws_secret('acme/db').username >>>",
    );

    project
        .render("bt01", "t.j2")
        .assert()
        .success()
        .stdout("app:s3cret:5432\nenv-key\nhttps://sentry.example.com/1\napp\n");
}

#[test]
fn test_by_env_selects_current_environment() {
    let project = TestProject::bootstrapped();
    project.write_template(
        "t.j2",
        "<<< by_env(bt01='mine', production='prod', default='other') >>>|\
         <<< by_env(staging='s', default='fallback') >>>",
    );

    project.render("bt01", "t.j2").assert().success().stdout("mine|fallback\n");
}

#[test]
fn test_statements_and_assignments() {
    let project = TestProject::bootstrapped();
    project.write_template(
        "t.j2",
        "<<% set hosts = ['a', 'b'] %>><<% for h in hosts %>><<< h >>>.<<< org_param('domain') >>> <<% endfor %>>",
    );

    project
        .render("bt01", "t.j2")
        .assert()
        .success()
        .stdout("a.zitcha.io b.zitcha.io \n");
}

#[test]
fn test_environmental_vars() {
    let project = TestProject::bootstrapped();
    project.write_template(
        "t.j2",
        "<<< environmental_vars('BUILD_ID') >>> <<< environmental_vars('NOT_SET_ANYWHERE', 'none') >>>",
    );

    project
        .render("bt01", "t.j2")
        .env("BUILD_ID", "42")
        .env_remove("NOT_SET_ANYWHERE")
        .assert()
        .success()
        .stdout("42 none\n");
}

#[cfg(unix)]
#[test]
fn test_environmental_vars_non_utf8_value_is_set() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< environmental_vars('LOCALE_NAME', 'unset') >>>");

    project
        .render("bt01", "t.j2")
        .env("LOCALE_NAME", OsStr::from_bytes(b"caf\xe9"))
        .assert()
        .success()
        .stdout("caf\u{FFFD}\n");
}

#[test]
fn test_include_relative_to_working_directory() {
    let project = TestProject::bootstrapped();
    project.write_template("partials/common.env", "ORG=<<< org_name >>>");
    project.write_template("app/main.env.j2", "ENV=<<< env_name >>>\n<<% include 'partials/common.env' %>>");

    project
        .render("bt01", "app/main.env.j2")
        .assert()
        .success()
        .stdout("ENV=bt01\nORG=zitcha\n");
}

#[test]
fn test_nothing_but_template_on_stdout() {
    let project = TestProject::bootstrapped();
    project.write_template("t.j2", "<<< env_name >>>");

    project
        .render("bt01", "t.j2")
        .env("RUST_LOG", "debug")
        .assert()
        .success()
        .stdout("bt01\n")
        .stderr(predicate::str::contains("DEBUG"));
}
