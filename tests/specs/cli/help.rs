//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    Workspace::empty()
        .lumity()
        .args(["--help"])
        .passes()
        .stdout_has("dump")
        .stdout_has("verify")
        .stdout_has("schema")
        .stdout_has("encode")
        .stdout_has("--config");
}

#[test]
fn version_names_the_tool() {
    Workspace::empty()
        .lumity()
        .args(["--version"])
        .passes()
        .stdout_has("lumity ");
}

#[test]
fn no_command_prints_usage() {
    Workspace::empty()
        .lumity()
        .fails()
        .stderr_has("Usage");
}

#[test]
fn dump_help_shows_reading_options() {
    Workspace::empty()
        .lumity()
        .args(["dump", "--help"])
        .passes()
        .stdout_has("--backward")
        .stdout_has("--block-size")
        .stdout_has("--limit")
        .stdout_has("--format");
}

#[test]
fn encode_help_explains_assignments() {
    Workspace::empty()
        .lumity()
        .args(["encode", "--help"])
        .passes()
        .stdout_has("FIELD=VALUE")
        .stdout_has("--definition");
}
