//! Error reporting specs
//!
//! Failures exit non-zero and explain themselves on stderr.

use crate::prelude::*;

#[test]
fn missing_log_cannot_be_opened() {
    Workspace::empty()
        .lumity()
        .args(["dump", "missing.log"])
        .fails()
        .stderr_has("cannot open missing.log");
}

#[test]
fn unknown_definition_points_at_the_schema() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 1, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Robot"])
        .fails()
        .stderr_has("unknown definition 'Robot'")
        .stderr_has("lumity schema app.log");
}

#[test]
fn unknown_field_points_at_the_schema() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 1, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Height=180"])
        .fails()
        .stderr_has("unknown field 'Height'");
}

#[test]
fn assignments_need_an_equals_sign() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 1, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Age"])
        .fails()
        .stderr_has("expected FIELD=VALUE, got 'Age'");
}

#[test]
fn values_must_parse_as_the_field_type() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 1, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Age=old"])
        .fails()
        .stderr_has("invalid uint value");
}

#[test]
fn refused_appends_leave_the_log_untouched() {
    let temp = Workspace::empty();
    let path = temp.people_log("app.log", 1, 0);
    let before = std::fs::read(&path).unwrap();

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Age=old"])
        .fails();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn bad_config_is_reported() {
    let temp = Workspace::empty();
    temp.file("lumity.toml", "[reader]\nblock_size = \"big\"\n");

    temp.lumity()
        .args(["--config", "lumity.toml", "schema"])
        .fails()
        .stderr_has("failed to parse config");
}

#[test]
fn config_values_are_validated() {
    let temp = Workspace::empty();
    temp.file("lumity.toml", "[reader]\nblock_size = 0\n");

    temp.lumity()
        .args(["--config", "lumity.toml", "schema"])
        .fails()
        .stderr_has("reader.block_size must be positive");
}
