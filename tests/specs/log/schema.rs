//! Schema specs
//!
//! The built-in schema and schemas rebuilt from logs.

use crate::prelude::*;

const DEFAULT_SCHEMA: &str = "\
definition    1  Blockchain.Transaction
definition    2  Blockchain.Field
definition    3  Blockchain.Type
definition    4  Blockchain.ProjectMeta
definition    5  Blockchain.Node
definition    6  Blockchain.BlockBoundary
definition    7  Blockchain.SetFields
definition    8  Blockchain.Archive
field         1  Timestamp uint
field         2  Name string
field         3  DataType uint
field         4  Immutable uint
field         5  InheritedId uint
field         6  Id uint
field         7  Description string
field         8  Version uint
field         9  ByteOffset uint
field        10  Signature bytes
field        11  BlockId uint
field        12  TransactionCount uint
field        13  InvalidTransaction uint
field        14  ProjectId bytes
field        15  Reason string
field        16  EntityId uint
field        17  DefinitionId uint
field        18  FieldId uint
field        19  Previous uint
field        20  Offset int
field        21  VariantTypeId uint
field        22  NodeId uint
";

#[test]
fn without_a_log_prints_the_defaults() {
    Workspace::empty()
        .lumity()
        .args(["schema"])
        .passes()
        .stdout_eq(DEFAULT_SCHEMA);
}

#[test]
fn missing_log_prints_the_defaults() {
    Workspace::empty()
        .lumity()
        .args(["schema", "new.log"])
        .passes()
        .stdout_eq(DEFAULT_SCHEMA);
}

#[test]
fn log_definitions_follow_the_defaults() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 2, 0);

    let expected = DEFAULT_SCHEMA.replace(
        "definition    8  Blockchain.Archive\n",
        "definition    8  Blockchain.Archive\ndefinition    9  Person\n",
    ) + "field        23  Age uint\nfield        24  Nickname string\n";

    temp.lumity()
        .args(["schema", "app.log"])
        .passes()
        .stdout_eq(&expected);
}

#[test]
fn inherited_types_show_their_parent() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 0, 0);

    temp.lumity()
        .args([
            "encode",
            "app.log",
            "-d",
            "Blockchain.Type",
            "-f",
            "Timestamp=2",
            "-f",
            "Name=Employee",
            "-f",
            "InheritedId=9",
        ])
        .passes();

    temp.lumity()
        .args(["schema", "app.log"])
        .passes()
        .stdout_has("definition   10  Employee : 9");
}

#[test]
fn json_lists_every_entry() {
    let temp = Workspace::empty();
    temp.people_log("app.log", 0, 0);

    let out = temp
        .lumity()
        .args(["schema", "app.log", "--format", "json"])
        .passes();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&out.stdout).unwrap();

    assert_eq!(entries.len(), 9 + 24);
    assert_eq!(entries[0]["kind"], "definition");
    assert_eq!(entries[0]["name"], "Blockchain.Transaction");
    let age = entries.iter().find(|e| e["name"] == "Age").unwrap();
    assert_eq!(age["kind"], "field");
    assert_eq!(age["id"], AGE);
    assert_eq!(age["data_type"], "uint");
}
