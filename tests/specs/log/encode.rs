//! Encode specs
//!
//! Appending transactions, including the schema transactions that name
//! later ones.

use crate::prelude::*;

fn define_person(temp: &Workspace) {
    temp.lumity()
        .args(["encode", "app.log", "-d", "Blockchain.Type"])
        .args(["-f", "Timestamp=now", "-f", "Name=Person"])
        .passes()
        .stdout_has("appended transaction 0 (");
    temp.lumity()
        .args(["encode", "app.log", "-d", "Blockchain.Field"])
        .args(["-f", "Timestamp=now", "-f", "Name=Age", "-f", "DataType=1"])
        .passes();
    temp.lumity()
        .args(["encode", "app.log", "-d", "2"])
        .args(["-f", "1=now", "-f", "Name=Nickname", "-f", "DataType=5"])
        .passes();
}

#[test]
fn builds_a_log_from_nothing() {
    let temp = Workspace::empty();
    define_person(&temp);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person"])
        .args(["-f", "Timestamp=now", "-f", "Age=36", "-f", "Nickname=ada"])
        .passes();

    temp.lumity()
        .args(["dump", "app.log"])
        .passes()
        .stdout_has(" Person (def 9) ")
        .stdout_has("  Age (23) = 36")
        .stdout_has("  Nickname (24) = \"ada\"")
        .stdout_lacks("INVALID");
}

#[test]
fn appends_land_at_the_end_of_the_log() {
    let temp = Workspace::empty();
    let path = temp.people_log("app.log", 2, 0);
    let len = std::fs::metadata(&path).unwrap().len();

    let out = temp
        .lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Age=7", "--format", "json"])
        .passes();
    let appended = &out.json_lines()[0];

    assert_eq!(appended["offset"], len);
    assert_eq!(appended["transaction_id"], len);
    let length = appended["length"].as_u64().unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), len + length);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Age=8"])
        .passes()
        .stdout_eq(&format!(
            "appended transaction {} (7 bytes at offset {})\n",
            len + length,
            len + length
        ));
}

#[test]
fn now_stamps_milliseconds() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 0, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Timestamp=now"])
        .passes();

    let out = temp
        .lumity()
        .args(["dump", "app.log", "--backward", "--limit", "1", "--format", "json"])
        .passes();
    let timestamp = out.json_lines()[0]["timestamp"].as_u64().unwrap();
    // after 2020-01-01 in milliseconds
    assert!(timestamp > 1_577_836_800_000, "{}", timestamp);
}

#[test]
fn id_field_overrides_the_transaction_id() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 1, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Id=9000", "-f", "Age=1"])
        .passes()
        .stdout_has("appended transaction 9000 (");

    temp.lumity()
        .args(["dump", "app.log", "--backward", "--limit", "1"])
        .passes()
        .stdout_has("#9000 Person (def 9)");
}

#[test]
fn null_empties_a_string_field() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 0, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Person", "-f", "Nickname=null"])
        .passes();

    temp.lumity()
        .args(["dump", "app.log", "--backward", "--limit", "1"])
        .passes()
        .stdout_has("  Nickname (24) = null");
}

#[test]
fn sealed_types_refuse_instances() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 0, 0);

    temp.lumity()
        .args(["encode", "app.log", "-d", "Blockchain.Type"])
        .args(["-f", "Timestamp=2", "-f", "Name=Sealed", "-f", "Immutable=2"])
        .passes();

    temp.lumity()
        .args(["encode", "app.log", "-d", "Sealed", "-f", "Timestamp=3"])
        .fails()
        .stderr_has("nothing written to app.log: Sealed cannot be instanced");
}
