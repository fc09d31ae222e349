//! The `check` command against real rule files.

mod common;

use common::Sandbox;
use organize_cli::commands::check;

#[test]
fn a_valid_rule_file_passes() {
    let sandbox = Sandbox::new();
    let rules = sandbox.write(
        "organize.toml",
        r#"
        [[rules]]
        name = "tidy downloads"
        locations = [{ path = "/downloads" }]
        filters = [{ name = "extension", params = { extensions = ["pdf", "epub"] } }]
        actions = [{ name = "move", params = { dest = "/books/" } }]
        "#,
    );
    assert!(check::execute(&rules).is_ok());
}

#[test]
fn unknown_capabilities_fail_the_check() {
    let sandbox = Sandbox::new();
    let rules = sandbox.write(
        "organize.toml",
        r#"
        [[rules]]
        locations = [{ path = "/downloads" }]
        actions = [{ name = "upload", params = { dest = "s3://bucket" } }]
        "#,
    );
    assert!(check::execute(&rules).is_err());
}

#[test]
fn toml_syntax_errors_are_reported() {
    let sandbox = Sandbox::new();
    let rules = sandbox.write("organize.toml", "[[rules]\nname = broken");
    assert!(check::execute(&rules).is_err());
}

#[test]
fn a_missing_file_is_an_error() {
    let sandbox = Sandbox::new();
    assert!(check::execute(&sandbox.path("nope.toml")).is_err());
}

#[test]
fn an_empty_rule_file_is_an_error() {
    let sandbox = Sandbox::new();
    let rules = sandbox.write("organize.toml", "");
    assert!(check::execute(&rules).is_err());
}

#[test]
fn a_bad_template_fails_the_check() {
    let sandbox = Sandbox::new();
    let rules = sandbox.write(
        "organize.toml",
        r#"
        [[rules]]
        locations = [{ path = "/downloads" }]
        actions = [{ name = "move", params = { dest = "/archive/{unclosed" } }]
        "#,
    );
    assert!(check::execute(&rules).is_err());
}
